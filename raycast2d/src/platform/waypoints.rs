use crate::{
    clock::Tick,
    collision::{Point2, Vec2},
    config::PlatformConfig,
    error::ConfigError,
};

/// Legs shorter than this count as already reached.
const MIN_LEG_LENGTH: f32 = 1.0e-6;

/// What the platform is doing at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraversalPhase {
    /// Interpolating between two waypoints.
    Traveling,
    /// Resting at a waypoint until the wait deadline passes.
    Paused,
}

/// Symmetric ease in/out: `t^a / (t^a + (1 - t)^a)` with `a = ease_amount + 1`.
///
/// `ease_amount == 0` is linear. `t` is clamped to `[0, 1]`.
pub fn ease(t: f32, ease_amount: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let a = ease_amount + 1.0;
    let rising = t.powf(a);
    rising / (rising + (1.0 - t).powf(a))
}

/// Waypoint traversal of one platform, in world space.
#[derive(Clone, Debug, PartialEq)]
pub struct WaypointPath {
    points: Vec<Point2>,
    cyclic: bool,
    speed: f32,
    ease_amount: f32,
    wait_time: f64,

    from_index: usize,
    progress: f32,
    resume_at: f64,
}

impl WaypointPath {
    /// Convert the configured local waypoints to world space around `origin`.
    pub fn new(origin: Point2, config: &PlatformConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            points: config.waypoints.iter().map(|w| origin + w).collect(),
            cyclic: config.cyclic,
            speed: config.speed,
            ease_amount: config.ease_amount,
            wait_time: config.wait_time,
            from_index: 0,
            progress: 0.0,
            resume_at: 0.0,
        })
    }

    /// World-space waypoints in their current traversal order.
    #[inline]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    #[inline]
    pub fn from_index(&self) -> usize {
        self.from_index
    }

    /// Uneased fraction of the current leg, in `[0, 1]`.
    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Simulation time at which a paused platform may move again.
    #[inline]
    pub fn resume_at(&self) -> f64 {
        self.resume_at
    }

    #[inline]
    pub fn is_cyclic(&self) -> bool {
        self.cyclic
    }

    pub fn phase(&self, now: f64) -> TraversalPhase {
        if now < self.resume_at {
            TraversalPhase::Paused
        } else {
            TraversalPhase::Traveling
        }
    }

    /// Move the cursor by one step and return the displacement from `position` to the new point
    /// on the path. Returns zero while paused.
    pub fn advance(&mut self, position: Point2, tick: Tick) -> Vec2 {
        if self.phase(tick.now) == TraversalPhase::Paused {
            return Vec2::zeros();
        }

        let count = self.points.len();
        if count == 0 {
            return Vec2::zeros();
        }
        self.from_index %= count;
        let to_index = (self.from_index + 1) % count;
        let from = self.points[self.from_index];
        let to = self.points[to_index];

        let leg_length = (to - from).norm();
        self.progress = if leg_length < MIN_LEG_LENGTH {
            1.0
        } else {
            (self.progress + tick.dt * self.speed / leg_length).clamp(0.0, 1.0)
        };

        let eased = ease(self.progress, self.ease_amount);
        let target = from + (to - from) * eased;

        if self.progress >= 1.0 {
            self.progress = 0.0;
            self.from_index += 1;

            if !self.cyclic && self.from_index >= count - 1 {
                self.from_index = 0;
                self.points.reverse();
                log::debug!("platform path reverses at waypoint {to:?}");
            }

            self.resume_at = tick.now + self.wait_time;
            log::debug!(
                "platform reached waypoint {to:?}, resuming at t={:.3}",
                self.resume_at
            );
        }

        target - position
    }
}
