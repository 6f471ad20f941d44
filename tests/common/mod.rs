#![allow(dead_code)]

use chip_8_frontend::{
    ExecutionFault, FrameClock, FrameQueue, LoadError, LoopHandle, Machine, Rgb, SCREEN_HEIGHT,
    SCREEN_WIDTH, Surface,
};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

pub const PROGRAM_CAPACITY: usize = 4096 - 0x200;

/// Every call that reaches the machine, the clock or the surface, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Reset,
    LoadProgram(Vec<u8>),
    Step,
    TickTimers,
    SetKey(usize, bool),
    Render,
    RequestFrame(LoopHandle),
    CancelFrame(LoopHandle),
}

/// A shared call log plus a switch to make the machine fault.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Rc<RefCell<Vec<Call>>>,
    steps_until_fault: Rc<Cell<Option<usize>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    /// The `n`th step from now returns an execution fault.
    pub fn fault_on_step(&self, n: usize) {
        self.steps_until_fault.set(Some(n));
    }

    fn should_fault(&self) -> bool {
        match self.steps_until_fault.get() {
            Some(1) => {
                self.steps_until_fault.set(None);
                true
            }
            Some(n) => {
                self.steps_until_fault.set(Some(n - 1));
                false
            }
            None => false,
        }
    }
}

/// Stands in for an interpreter. Remembers the loaded program so tests can tell which ROM it
/// is running.
pub struct RecordingMachine {
    recorder: Recorder,
    program: Vec<u8>,
    fb: Vec<bool>,
    keys: [bool; 16],
}

impl RecordingMachine {
    pub fn new(recorder: &Recorder) -> Self {
        Self {
            recorder: recorder.clone(),
            program: Vec::new(),
            fb: vec![false; SCREEN_WIDTH * SCREEN_HEIGHT],
            keys: [false; 16],
        }
    }

    pub fn program(&self) -> &[u8] {
        &self.program
    }

    pub fn key(&self, index: usize) -> bool {
        self.keys[index]
    }
}

impl Machine for RecordingMachine {
    fn reset(&mut self) {
        self.recorder.record(Call::Reset);
        self.program.clear();
        self.fb.iter_mut().for_each(|pixel| *pixel = false);
        self.keys = [false; 16];
    }

    fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        self.recorder.record(Call::LoadProgram(program.to_vec()));
        if program.len() > PROGRAM_CAPACITY {
            return Err(LoadError::TooLarge {
                size: program.len(),
                capacity: PROGRAM_CAPACITY,
            });
        }
        self.program = program.to_vec();
        Ok(())
    }

    fn step(&mut self) -> Result<(), ExecutionFault> {
        self.recorder.record(Call::Step);
        if self.recorder.should_fault() {
            return Err(ExecutionFault {
                address: 0x200,
                opcode: 0xf0ff,
            });
        }
        Ok(())
    }

    fn tick_timers(&mut self) {
        self.recorder.record(Call::TickTimers);
    }

    fn display(&self) -> &[bool] {
        &self.fb
    }

    fn set_key(&mut self, index: usize, pressed: bool) {
        self.recorder.record(Call::SetKey(index, pressed));
        self.keys[index] = pressed;
    }
}

/// A frame queue that also logs requests and cancellations.
#[derive(Clone)]
pub struct RecordingClock {
    recorder: Recorder,
    queue: FrameQueue,
}

impl RecordingClock {
    pub fn new(recorder: &Recorder) -> Self {
        Self {
            recorder: recorder.clone(),
            queue: FrameQueue::new(),
        }
    }

    pub fn pop_due(&self) -> Option<LoopHandle> {
        self.queue.pop_due()
    }

    pub fn pending(&self) -> usize {
        self.queue.pending()
    }
}

impl FrameClock for RecordingClock {
    fn request_frame(&mut self) -> LoopHandle {
        let handle = self.queue.request_frame();
        self.recorder.record(Call::RequestFrame(handle));
        handle
    }

    fn cancel_frame(&mut self, handle: LoopHandle) {
        self.recorder.record(Call::CancelFrame(handle));
        self.queue.cancel_frame(handle);
    }
}

/// Records one `Render` per presented frame.
pub struct RecordingSurface {
    recorder: Recorder,
}

impl RecordingSurface {
    pub fn new(recorder: &Recorder) -> Self {
        Self {
            recorder: recorder.clone(),
        }
    }
}

impl Surface for RecordingSurface {
    fn fill(&mut self, _color: Rgb) -> Result<(), String> {
        Ok(())
    }

    fn fill_square(&mut self, _x: u32, _y: u32, _size: u32, _color: Rgb) -> Result<(), String> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), String> {
        self.recorder.record(Call::Render);
        Ok(())
    }
}

/// A surface whose frames never make it to the screen, like a lost graphics context.
pub struct BrokenSurface;

impl Surface for BrokenSurface {
    fn fill(&mut self, _color: Rgb) -> Result<(), String> {
        Ok(())
    }

    fn fill_square(&mut self, _x: u32, _y: u32, _size: u32, _color: Rgb) -> Result<(), String> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), String> {
        Err("display lost".to_string())
    }
}
