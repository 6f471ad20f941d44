//! A frontend for Chip-8 interpreters: it paces the interpreter against the display's frame
//! clock, draws its frame buffer, feeds it keyboard input and loads programs on request.
//!
//! The interpreter itself plugs in through [`Machine`]. A [`Session`] owns it together with an
//! [`ExecutionScheduler`], which runs a fixed batch of instructions plus one timer tick per
//! animation frame and redraws the screen before asking for the next frame.

pub mod clock;
pub mod configuration;
pub mod error;
pub mod keypad;
pub mod machine;
pub mod renderer;
pub mod rom;
pub mod scheduler;
pub mod session;

#[cfg(feature = "sdl-host")]
pub mod host;

pub use clock::{FrameClock, FrameQueue, LoopHandle};
pub use configuration::Settings;
pub use error::{ConfigurationError, ExecutionFault, FetchError, LoadError, SessionError};
pub use keypad::KeyMapper;
pub use machine::{Machine, NUM_KEYS, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use renderer::{FrameRenderer, MAX_SCALE, PixelBuffer, Rgb, Surface};
pub use rom::{FileRomSource, RomLibrary, RomSource};
pub use scheduler::{ExecutionScheduler, FrameOutcome, SchedulerState};
pub use session::{Session, SessionStatus};
