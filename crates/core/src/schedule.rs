//! Frame scheduling contract for the render loop.
//!
//! A host hands out one [`FrameToken`] per requested frame and later reports
//! the token back when the frame is due. Cancelling a token guarantees the
//! host never reports it. [`QueuedScheduler`] is a deterministic in-memory
//! host used by the headless CLI and by tests.

use std::collections::VecDeque;

/// Opaque handle for one requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

impl FrameToken {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Host-side frame scheduling.
pub trait FrameScheduler {
    /// Requests a callback on the next frame.
    fn request_frame(&mut self) -> FrameToken;

    /// Cancels a pending request. Unknown or already delivered tokens are ignored.
    fn cancel_frame(&mut self, token: FrameToken);
}

/// FIFO scheduler that delivers frames when the host pulls them.
#[derive(Debug, Default)]
pub struct QueuedScheduler {
    next_id: u64,
    pending: VecDeque<FrameToken>,
    requested: u64,
    cancelled: u64,
}

impl QueuedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pops the oldest pending frame, if any.
    pub fn next_due(&mut self) -> Option<FrameToken> {
        self.pending.pop_front()
    }

    /// Frames requested and not yet delivered or cancelled.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Total frames ever requested.
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Total pending frames removed by `cancel_frame`.
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for QueuedScheduler {
    fn request_frame(&mut self) -> FrameToken {
        let token = FrameToken(self.next_id);
        self.next_id += 1;
        self.requested += 1;
        self.pending.push_back(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        let before = self.pending.len();
        self.pending.retain(|t| *t != token);
        if self.pending.len() < before {
            self.cancelled += 1;
        }
    }
}
