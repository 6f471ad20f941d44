use std::{cell::RefCell, collections::VecDeque, rc::Rc};

/// Identifies one requested animation frame. Handles are never reused by a clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoopHandle(u64);

impl LoopHandle {
    /// The clock's number for this frame request, for log lines.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// The host's animation tick, reduced to "call me back on the next frame" and "never mind".
///
/// A request is single-shot: the host fires each handle at most once, and after
/// [`FrameClock::cancel_frame`] it must not fire that handle at all.
pub trait FrameClock {
    fn request_frame(&mut self) -> LoopHandle;

    fn cancel_frame(&mut self, handle: LoopHandle);
}

#[derive(Debug, Default)]
struct QueueState {
    next_id: u64,
    pending: VecDeque<LoopHandle>,
}

/// A single-threaded frame clock for hosts that drive their own loop. Cloning gives another view
/// of the same queue, so the host can keep one clone to pop due frames while the scheduler owns
/// the other.
#[derive(Clone, Debug, Default)]
pub struct FrameQueue {
    state: Rc<RefCell<QueueState>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the oldest requested frame, if any. Call once per display refresh and hand the
    /// result to the session.
    pub fn pop_due(&self) -> Option<LoopHandle> {
        self.state.borrow_mut().pending.pop_front()
    }

    /// Number of frames requested and not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }
}

impl FrameClock for FrameQueue {
    fn request_frame(&mut self) -> LoopHandle {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let handle = LoopHandle(state.next_id);
        state.pending.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: LoopHandle) {
        self.state
            .borrow_mut()
            .pending
            .retain(|pending| *pending != handle);
    }
}
