//! Host scheduling seam: animation frames, delays, and the clock.
//!
//! The engine never registers callbacks itself. It asks the [`Scheduler`] for
//! a frame or a delay and gets back an id; when the host's frame or timer
//! fires, the host calls [`crate::engine::EngineCore::on_frame`] or
//! [`crate::engine::EngineCore::on_timer`] with that id. Cancelling is a
//! matching call on the scheduler, so every `request_*` has a `cancel_*`.
//!
//! [`ManualScheduler`] is a deterministic implementation driven by an explicit
//! clock, used by tests and the headless CLI.

#[cfg(test)]
#[path = "schedule_test.rs"]
mod schedule_test;

/// Handle for a requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Handle for a scheduled delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Frame and timer primitives supplied by the host runtime.
pub trait Scheduler {
    /// Request a callback on the next animation frame.
    fn request_frame(&mut self) -> FrameId;
    /// Cancel a frame request. Unknown ids are ignored.
    fn cancel_frame(&mut self, id: FrameId);
    /// Request a callback after `ms` milliseconds.
    fn delay(&mut self, ms: f64) -> TimerId;
    /// Cancel a delay. Unknown ids are ignored.
    fn cancel_delay(&mut self, id: TimerId);
    /// Monotonic time in milliseconds.
    fn now_ms(&self) -> f64;
}

/// Deterministic scheduler with a hand-advanced clock.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: f64,
    next_id: u64,
    frames: Vec<FrameId>,
    timers: Vec<(TimerId, f64)>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward and return the timers that came due, earliest first.
    pub fn advance(&mut self, ms: f64) -> Vec<TimerId> {
        self.now += ms;
        let now = self.now;
        let mut due: Vec<(TimerId, f64)> = Vec::new();
        self.timers.retain(|&(id, at)| {
            if at <= now {
                due.push((id, at));
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.1.total_cmp(&b.1));
        due.into_iter().map(|(id, _)| id).collect()
    }

    /// Drain the outstanding frame requests, as a browser does at the start of a frame.
    pub fn take_frames(&mut self) -> Vec<FrameId> {
        std::mem::take(&mut self.frames)
    }

    /// Number of outstanding frame requests.
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of outstanding delays.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Scheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameId {
        let id = FrameId(self.next());
        self.frames.push(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.frames.retain(|f| *f != id);
    }

    fn delay(&mut self, ms: f64) -> TimerId {
        let id = TimerId(self.next());
        self.timers.push((id, self.now + ms.max(0.0)));
        id
    }

    fn cancel_delay(&mut self, id: TimerId) {
        self.timers.retain(|(t, _)| *t != id);
    }

    fn now_ms(&self) -> f64 {
        self.now
    }
}
