//! Monotonic simulation clock.
//!
//! Every resolver and platform call receives a [`Tick`]. Deadlines (fall-through cooldown,
//! waypoint pause) are compared against `Tick::now`; nothing in the core blocks or schedules
//! callbacks.

use crate::collision::settings::MAX_FRAME_DT;

/// Context of one simulation step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tick {
    /// Seconds since the clock started. Never decreases.
    pub now: f64,
    /// Length of this step in seconds.
    pub dt: f32,
    /// Index of this step, starting at 1 for the first advanced step.
    pub frame: u64,
}

impl Tick {
    #[inline]
    pub fn new(now: f64, dt: f32, frame: u64) -> Self {
        Self { now, dt, frame }
    }
}

/// Accumulates step durations into monotonic [`Tick`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimClock {
    now: f64,
    frame: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tick without advancing.
    pub fn current(&self) -> Tick {
        Tick::new(self.now, 0.0, self.frame)
    }

    /// Advance by `dt` seconds, clamped to `[0, MAX_FRAME_DT]`.
    ///
    /// Non-finite input counts as a zero-length step.
    pub fn advance(&mut self, dt: f32) -> Tick {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.now += f64::from(dt);
        self.frame += 1;
        Tick::new(self.now, dt, self.frame)
    }
}
