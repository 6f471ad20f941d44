use std::time::{Duration, Instant};

/// Keeps the host loop at a fixed frame rate when vsync can't be relied on, e.g. while no program
/// is running and nothing is presented.
pub struct FramePacer {
    frame_duration: Duration,
    wait_to: Instant,
}

impl FramePacer {
    pub fn new(frame_rate: u32) -> Self {
        Self {
            frame_duration: Duration::from_secs(1) / frame_rate.max(1),
            wait_to: Instant::now(),
        }
    }

    /// Sleeps until the next frame is due.
    pub fn wait(&mut self) {
        let now = Instant::now();

        if now < self.wait_to {
            spin_sleep::sleep(self.wait_to - now);
            self.wait_to += self.frame_duration;
        } else {
            // Fell behind, don't try to catch up with a burst of frames
            self.wait_to = now + self.frame_duration;
        }
    }
}
