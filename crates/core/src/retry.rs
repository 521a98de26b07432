//! Bounded retry over animation frames.
//!
//! Content can mount a few frames after the sequencer starts. Instead of
//! blocking, each failed probe yields until the next frame and tries again,
//! up to a fixed budget. Running out of budget is a silent no-op.

/// Opaque handle of a scheduled frame callback (`requestAnimationFrame` id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Something that can run a callback on the next frame.
pub trait FrameScheduler {
    /// Schedule one frame. `None` if scheduling is unavailable.
    fn request_frame(&mut self) -> Option<FrameHandle>;

    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Frames to wait for the subsection wrapper before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Outcome of one [`BoundedRetry::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryStep<T> {
    Ready(T),
    /// The probe failed; another attempt is scheduled for the next frame.
    Pending,
    /// The budget is spent (or no frame could be scheduled).
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct BoundedRetry {
    max_attempts: u32,
    attempts: u32,
    pending: Option<FrameHandle>,
}

impl BoundedRetry {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            attempts: 0,
            pending: None,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Run one attempt.
    ///
    /// The probe receives the scheduler so it can query the same host that
    /// schedules frames. Call again from the frame callback while the result
    /// is [`RetryStep::Pending`].
    pub fn poll<S, T>(
        &mut self,
        scheduler: &mut S,
        probe: impl FnOnce(&mut S) -> Option<T>,
    ) -> RetryStep<T>
    where
        S: FrameScheduler + ?Sized,
    {
        self.pending = None;
        if self.attempts >= self.max_attempts {
            return RetryStep::Exhausted;
        }
        self.attempts += 1;
        if let Some(value) = probe(scheduler) {
            return RetryStep::Ready(value);
        }
        if self.attempts >= self.max_attempts {
            return RetryStep::Exhausted;
        }
        match scheduler.request_frame() {
            Some(handle) => {
                self.pending = Some(handle);
                RetryStep::Pending
            }
            None => RetryStep::Exhausted,
        }
    }

    /// Cancel the scheduled attempt, if any.
    pub fn cancel<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
    }

    /// Rearm with a fresh budget. Does not cancel a pending frame.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.pending = None;
    }
}

impl Default for BoundedRetry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}
