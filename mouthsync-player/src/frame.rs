//! Per-display-frame scheduling

use std::collections::VecDeque;

/// Identifies one requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// The host's once-per-display-refresh callback mechanism.
///
/// `request_frame` asks for a single callback on the next refresh; the host
/// later delivers it by calling [`crate::Player::on_frame`] with the returned
/// handle. A cancelled handle must never be delivered.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler for hosts that pump frames themselves
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: VecDeque<FrameHandle>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every handle requested so far.
    ///
    /// Frames requested while the returned handles are being delivered belong
    /// to the next refresh.
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        self.pending.drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|pending| *pending != handle);
    }
}
