use crate::{
    clock::{FrameClock, LoopHandle},
    configuration::Settings,
    error::{ConfigurationError, SessionError},
    machine::Machine,
    renderer::{FrameRenderer, Surface},
};
use log::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// No frame is requested.
    Idle,
    /// Exactly one frame is requested and will do work when it fires.
    Running(LoopHandle),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The frame was the live one: the machine was stepped, the screen redrawn and the next
    /// frame requested.
    Rendered,
    /// The frame had been cancelled or superseded. Nothing was touched.
    Stale,
}

/// Drives a machine one animation frame at a time.
///
/// Every frame runs `ticks_per_frame` instructions, then one timer tick, then one render pass,
/// and only then asks the clock for the next frame. Since the next frame is requested last, two
/// frames can never overlap, and since only the newest handle is honoured, at most one loop is
/// ever driving the machine.
pub struct ExecutionScheduler<C: FrameClock> {
    clock: C,
    renderer: FrameRenderer,
    ticks_per_frame: usize,
    live: Option<LoopHandle>,
    frames_rendered: u64,
}

impl<C: FrameClock> ExecutionScheduler<C> {
    /// An idle scheduler that will request frames from `clock`. The tick budget is fixed for
    /// its whole life and must be at least 1.
    pub fn new(
        clock: C,
        renderer: FrameRenderer,
        ticks_per_frame: usize,
    ) -> Result<Self, ConfigurationError> {
        if ticks_per_frame == 0 {
            return Err(ConfigurationError::ZeroTickBudget);
        }

        Ok(Self {
            clock,
            renderer,
            ticks_per_frame,
            live: None,
            frames_rendered: 0,
        })
    }

    pub fn from_settings(clock: C, settings: &Settings) -> Result<Self, ConfigurationError> {
        Self::new(
            clock,
            FrameRenderer::from_settings(&settings.window)?,
            settings.scheduler.ticks_per_frame,
        )
    }

    /// Idle, or running with the handle of the one frame currently requested.
    pub fn state(&self) -> SchedulerState {
        match self.live {
            Some(handle) => SchedulerState::Running(handle),
            None => SchedulerState::Idle,
        }
    }

    /// Whether a frame is requested. Goes false on cancel, fault or render failure.
    pub fn is_running(&self) -> bool {
        self.live.is_some()
    }

    pub fn ticks_per_frame(&self) -> usize {
        self.ticks_per_frame
    }

    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }

    /// Frames completed since the scheduler was created, across all runs.
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Starts a new run: the first frame's work happens right away and the next frame is
    /// requested. Any live frame from an earlier run is cancelled first.
    pub fn start<M, S>(&mut self, machine: &mut M, surface: &mut S) -> Result<(), SessionError>
    where
        M: Machine + ?Sized,
        S: Surface + ?Sized,
    {
        self.cancel();
        self.run_frame(machine, surface)
    }

    /// Called by the host when `handle` fires. Only the live handle does any work.
    ///
    /// If the machine faults or the frame can't be drawn, the run ends: the scheduler goes idle
    /// and the error is returned.
    pub fn fire<M, S>(
        &mut self,
        handle: LoopHandle,
        machine: &mut M,
        surface: &mut S,
    ) -> Result<FrameOutcome, SessionError>
    where
        M: Machine + ?Sized,
        S: Surface + ?Sized,
    {
        if self.live != Some(handle) {
            trace!("Ignoring stale frame {}", handle.id());
            return Ok(FrameOutcome::Stale);
        }

        self.live = None;
        self.run_frame(machine, surface)?;
        Ok(FrameOutcome::Rendered)
    }

    /// Ends the current run without doing any more work. Returns the cancelled handle, if a run
    /// was live.
    pub fn cancel(&mut self) -> Option<LoopHandle> {
        let handle = self.live.take()?;
        self.clock.cancel_frame(handle);
        debug!("Cancelled frame {}", handle.id());
        Some(handle)
    }

    fn run_frame<M, S>(&mut self, machine: &mut M, surface: &mut S) -> Result<(), SessionError>
    where
        M: Machine + ?Sized,
        S: Surface + ?Sized,
    {
        // Run the instruction batch. A fault returns with `live` already cleared
        for _ in 0..self.ticks_per_frame {
            machine.step()?;
        }
        // Timers tick once per frame, at the display rate
        machine.tick_timers();

        self.renderer
            .render(machine, surface)
            .map_err(SessionError::Render)?;
        self.frames_rendered += 1;

        // Request the next frame only once this one is finished
        let next = self.clock.request_frame();
        trace!("Frame {} done, requested {}", self.frames_rendered, next.id());
        self.live = Some(next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::FrameQueue,
        error::{ExecutionFault, LoadError},
        machine::{SCREEN_HEIGHT, SCREEN_WIDTH},
        renderer::PixelBuffer,
    };

    /// Counts calls and can be told to fault on a given step.
    struct Counter {
        steps: usize,
        timer_ticks: usize,
        fault_on_step: Option<usize>,
        fb: Vec<bool>,
    }

    impl Counter {
        fn new() -> Self {
            Self {
                steps: 0,
                timer_ticks: 0,
                fault_on_step: None,
                fb: vec![false; SCREEN_WIDTH * SCREEN_HEIGHT],
            }
        }
    }

    impl Machine for Counter {
        fn reset(&mut self) {}
        fn load_program(&mut self, _program: &[u8]) -> Result<(), LoadError> {
            Ok(())
        }
        fn step(&mut self) -> Result<(), ExecutionFault> {
            self.steps += 1;
            if self.fault_on_step == Some(self.steps) {
                return Err(ExecutionFault {
                    address: 0x200,
                    opcode: 0xffff,
                });
            }
            // Light one pixel per step so renders are distinguishable
            let pixel = self.steps % self.fb.len();
            self.fb[pixel] = true;
            Ok(())
        }
        fn tick_timers(&mut self) {
            self.timer_ticks += 1;
        }
        fn display(&self) -> &[bool] {
            &self.fb
        }
        fn set_key(&mut self, _index: usize, _pressed: bool) {}
    }

    fn scheduler(clock: &FrameQueue, ticks: usize) -> ExecutionScheduler<FrameQueue> {
        let renderer = FrameRenderer::new(1, [0, 0, 0], [255, 255, 255]).unwrap();
        ExecutionScheduler::new(clock.clone(), renderer, ticks).unwrap()
    }

    #[test]
    fn zero_tick_budget_is_rejected() {
        let renderer = FrameRenderer::new(1, [0, 0, 0], [255, 255, 255]).unwrap();
        assert!(matches!(
            ExecutionScheduler::new(FrameQueue::new(), renderer, 0),
            Err(ConfigurationError::ZeroTickBudget)
        ));
    }

    #[test]
    fn start_runs_one_frame_and_requests_the_next() {
        let clock = FrameQueue::new();
        let mut scheduler = scheduler(&clock, 10);
        let mut machine = Counter::new();
        let mut surface = PixelBuffer::new(64, 32).unwrap();

        scheduler.start(&mut machine, &mut surface).unwrap();

        assert_eq!(machine.steps, 10);
        assert_eq!(machine.timer_ticks, 1);
        assert_eq!(scheduler.frames_rendered(), 1);
        assert_eq!(clock.pending(), 1);
        assert!(scheduler.is_running());
    }

    #[test]
    fn each_firing_runs_exactly_one_batch() {
        let clock = FrameQueue::new();
        let mut scheduler = scheduler(&clock, 7);
        let mut machine = Counter::new();
        let mut surface = PixelBuffer::new(64, 32).unwrap();

        scheduler.start(&mut machine, &mut surface).unwrap();
        for _ in 0..3 {
            let handle = clock.pop_due().unwrap();
            assert_eq!(
                scheduler.fire(handle, &mut machine, &mut surface).unwrap(),
                FrameOutcome::Rendered
            );
        }

        assert_eq!(machine.steps, 28);
        assert_eq!(machine.timer_ticks, 4);
        assert_eq!(clock.pending(), 1);
        assert_eq!(surface.pixel(28, 0), Some([255, 255, 255]));
    }

    #[test]
    fn stale_handle_does_nothing() {
        let clock = FrameQueue::new();
        let mut scheduler = scheduler(&clock, 10);
        let mut machine = Counter::new();
        let mut surface = PixelBuffer::new(64, 32).unwrap();

        scheduler.start(&mut machine, &mut surface).unwrap();
        let old = clock.pop_due().unwrap();
        scheduler.fire(old, &mut machine, &mut surface).unwrap();

        assert_eq!(
            scheduler.fire(old, &mut machine, &mut surface).unwrap(),
            FrameOutcome::Stale
        );
        assert_eq!(machine.steps, 20);
        assert_eq!(machine.timer_ticks, 2);
    }

    #[test]
    fn cancel_is_pure_teardown() {
        let clock = FrameQueue::new();
        let mut scheduler = scheduler(&clock, 10);
        let mut machine = Counter::new();
        let mut surface = PixelBuffer::new(64, 32).unwrap();

        scheduler.start(&mut machine, &mut surface).unwrap();
        assert!(scheduler.cancel().is_some());

        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(clock.pending(), 0);
        assert_eq!(machine.steps, 10);
        assert!(scheduler.cancel().is_none());
    }

    #[test]
    fn restart_leaves_a_single_live_frame() {
        let clock = FrameQueue::new();
        let mut scheduler = scheduler(&clock, 10);
        let mut machine = Counter::new();
        let mut surface = PixelBuffer::new(64, 32).unwrap();

        scheduler.start(&mut machine, &mut surface).unwrap();
        scheduler.start(&mut machine, &mut surface).unwrap();

        assert_eq!(clock.pending(), 1);
        let SchedulerState::Running(live) = scheduler.state() else {
            panic!("scheduler should be running");
        };
        assert_eq!(clock.pop_due(), Some(live));
    }

    #[test]
    fn fault_stops_the_batch_and_the_loop() {
        let clock = FrameQueue::new();
        let mut scheduler = scheduler(&clock, 10);
        let mut machine = Counter::new();
        let mut surface = PixelBuffer::new(64, 32).unwrap();

        scheduler.start(&mut machine, &mut surface).unwrap();
        machine.fault_on_step = Some(15);
        let handle = clock.pop_due().unwrap();

        let result = scheduler.fire(handle, &mut machine, &mut surface);

        assert!(matches!(result, Err(SessionError::Fault(_))));
        assert_eq!(machine.steps, 15);
        assert_eq!(machine.timer_ticks, 1);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn render_failure_stops_the_loop() {
        let clock = FrameQueue::new();
        let mut scheduler = scheduler(&clock, 10);
        let mut machine = Counter::new();
        // Too narrow for pixel (4, 0)
        let mut surface = PixelBuffer::new(4, 1).unwrap();

        let result = scheduler.start(&mut machine, &mut surface);

        assert!(matches!(result, Err(SessionError::Render(_))));
        assert!(!scheduler.is_running());
        assert_eq!(clock.pending(), 0);
    }
}
