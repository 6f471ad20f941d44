use crate::error::{ExecutionFault, LoadError};

/// Width of the Chip-8 frame buffer in pixels.
pub const SCREEN_WIDTH: usize = 64;
/// Height of the Chip-8 frame buffer in pixels.
pub const SCREEN_HEIGHT: usize = 32;
/// Number of keys on the Chip-8 hex keypad (0x0 to 0xf).
pub const NUM_KEYS: usize = 16;

/// The interpreter the frontend drives. Opcode decoding, memory, registers and timers all live
/// behind this trait, so any Chip-8 core (or a test double) can be plugged into a session.
///
/// A freshly constructed machine must already be in its power-on state.
pub trait Machine {
    /// Returns the machine to its power-on state: memory, registers, frame buffer and timers
    /// are cleared.
    fn reset(&mut self);

    /// Copies a raw program image into memory at the program origin (0x200). Only valid right
    /// after [`Machine::reset`].
    fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError>;

    /// Executes exactly one instruction.
    fn step(&mut self) -> Result<(), ExecutionFault>;

    /// Decrements the delay and sound timers by one, stopping at zero.
    fn tick_timers(&mut self);

    /// The frame buffer, row-major, `SCREEN_WIDTH * SCREEN_HEIGHT` pixels. `true` is lit.
    fn display(&self) -> &[bool];

    /// Sets key `index` (0x0 to 0xf) to pressed or released.
    fn set_key(&mut self, index: usize, pressed: bool);

    /// Whether the buzzer should currently be sounding.
    fn sound_active(&self) -> bool {
        false
    }
}

impl<M: Machine + ?Sized> Machine for Box<M> {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        (**self).load_program(program)
    }

    fn step(&mut self) -> Result<(), ExecutionFault> {
        (**self).step()
    }

    fn tick_timers(&mut self) {
        (**self).tick_timers()
    }

    fn display(&self) -> &[bool] {
        (**self).display()
    }

    fn set_key(&mut self, index: usize, pressed: bool) {
        (**self).set_key(index, pressed)
    }

    fn sound_active(&self) -> bool {
        (**self).sound_active()
    }
}
