use crate::{
    clock::{FrameClock, LoopHandle},
    configuration::Settings,
    error::{ConfigurationError, SessionError},
    keypad::KeyMapper,
    machine::Machine,
    renderer::Surface,
    rom::RomSource,
    scheduler::{ExecutionScheduler, FrameOutcome},
};
use log::{error, info, warn};
use std::fmt;

/// What the user should be told about the session. Load problems and execution faults are kept
/// apart so a frontend can show them differently.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running { rom: String },
    LoadFailed { rom: String, message: String },
    Faulted { rom: String, message: String },
}

impl SessionStatus {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            SessionStatus::LoadFailed { .. } | SessionStatus::Faulted { .. }
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "no program loaded"),
            SessionStatus::Running { rom } => write!(f, "running {rom}"),
            SessionStatus::LoadFailed { rom, message } => {
                write!(f, "could not load {rom}: {message}")
            }
            SessionStatus::Faulted { rom, message } => write!(f, "{rom} crashed: {message}"),
        }
    }
}

/// Owns the machine and everything that touches it: the ROM source, the scheduler driving it and
/// the key mapper feeding it.
pub struct Session<M, C, R>
where
    M: Machine,
    C: FrameClock,
    R: RomSource,
{
    machine: M,
    scheduler: ExecutionScheduler<C>,
    source: R,
    keypad: KeyMapper,
    rom: Option<String>,
    status: SessionStatus,
}

impl<M, C, R> Session<M, C, R>
where
    M: Machine,
    C: FrameClock,
    R: RomSource,
{
    /// An idle session. Nothing runs until [`Session::load`] is called.
    pub fn new(machine: M, scheduler: ExecutionScheduler<C>, source: R, keypad: KeyMapper) -> Self {
        Self {
            machine,
            scheduler,
            source,
            keypad,
            rom: None,
            status: SessionStatus::Idle,
        }
    }

    pub fn from_settings(
        machine: M,
        clock: C,
        source: R,
        settings: &Settings,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::new(
            machine,
            ExecutionScheduler::from_settings(clock, settings)?,
            source,
            KeyMapper::from_settings(&settings.keypad)?,
        ))
    }

    /// What the player should be told: idle, running, failed to load or crashed.
    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// The ROM most recently asked for, whether or not it loaded.
    pub fn rom(&self) -> Option<&str> {
        self.rom.as_deref()
    }

    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn scheduler(&self) -> &ExecutionScheduler<C> {
        &self.scheduler
    }

    /// Blanks the surface to the background colour, for hosts that show a window before the
    /// first program is chosen.
    pub fn clear<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<(), SessionError> {
        self.scheduler
            .renderer()
            .clear(surface)
            .map_err(SessionError::Render)
    }

    /// Stops whatever is running, then fetches `rom`, resets the machine, loads the program and
    /// starts a new run whose first frame is drawn before this returns.
    ///
    /// On failure the scheduler is left idle, the status says what went wrong and the error is
    /// returned. If fetching fails the machine is not touched.
    pub fn load<S: Surface + ?Sized>(
        &mut self,
        rom: &str,
        surface: &mut S,
    ) -> Result<(), SessionError> {
        // The old loop must be dead before anything else happens, even if this load fails
        self.scheduler.cancel();
        self.rom = Some(rom.to_string());
        self.status = SessionStatus::Idle;

        // Fetch before touching the machine
        let program = match self.source.fetch(rom) {
            Ok(program) => program,
            Err(err) => return Err(self.load_failed(err.into())),
        };

        self.machine.reset();
        if let Err(err) = self.machine.load_program(&program) {
            return Err(self.load_failed(err.into()));
        }

        // Runs the first frame now. A fault here is a crash, not a load failure
        if let Err(err) = self.scheduler.start(&mut self.machine, surface) {
            return Err(self.faulted(err));
        }

        info!("Loaded game from: {rom} ({} bytes)", program.len());
        self.status = SessionStatus::Running {
            rom: rom.to_string(),
        };
        Ok(())
    }

    /// The host's animation callback. Frames that aren't the live one are ignored.
    pub fn on_frame<S: Surface + ?Sized>(
        &mut self,
        handle: LoopHandle,
        surface: &mut S,
    ) -> Result<FrameOutcome, SessionError> {
        self.scheduler
            .fire(handle, &mut self.machine, surface)
            .map_err(|err| self.faulted(err))
    }

    /// Forwards a physical key transition to the machine. Returns whether the key is mapped.
    pub fn key_event(&mut self, physical_key: &str, pressed: bool) -> bool {
        self.keypad.apply(&mut self.machine, physical_key, pressed)
    }

    /// Ends the current run without touching the machine. Returns whether anything was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.scheduler.cancel().is_some();
        if was_running {
            info!("Stopped {}", self.rom.as_deref().unwrap_or("session"));
            self.status = SessionStatus::Idle;
        }
        was_running
    }

    fn current_rom(&self) -> String {
        self.rom.clone().unwrap_or_default()
    }

    fn load_failed(&mut self, err: SessionError) -> SessionError {
        let rom = self.current_rom();
        warn!("Error loading game from {rom}: {err}");
        self.status = SessionStatus::LoadFailed {
            rom,
            message: err.to_string(),
        };
        err
    }

    fn faulted(&mut self, err: SessionError) -> SessionError {
        let rom = self.current_rom();
        error!("Stopped {rom}: {err}");
        self.status = SessionStatus::Faulted {
            rom,
            message: err.to_string(),
        };
        err
    }
}
