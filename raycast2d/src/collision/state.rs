use serde::{Deserialize, Serialize};

use crate::collision::types::Vec2;

/// Horizontal facing of a body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// +1 for right, -1 for left.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Facing implied by a non-zero horizontal velocity.
    #[inline]
    pub fn from_velocity(vx: f32) -> Self {
        if vx < 0.0 { Self::Left } else { Self::Right }
    }
}

/// Contact and slope state of one body, as left by the latest resolution call.
///
/// Owned by the body's resolver; every other system reads it through
/// [`crate::collision::BodyController::state`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionState {
    pub above: bool,
    pub below: bool,
    pub left: bool,
    pub right: bool,

    /// Degrees between the surface normal under the body and +Y; 0 when flat.
    pub slope_angle: f32,
    pub slope_angle_previous_frame: f32,

    pub ascending_slope: bool,
    pub descending_slope: bool,

    pub facing: Facing,

    /// True while one-way platforms are being ignored after a drop request.
    pub falling_through_platform: bool,
    /// Simulation time at which `falling_through_platform` clears.
    pub fall_through_until: Option<f64>,

    /// Velocity requested this frame before any slope adjustment.
    pub previous_velocity: Vec2,
}

impl CollisionState {
    pub fn new(facing: Facing) -> Self {
        Self {
            facing,
            ..Self::default()
        }
    }

    /// Clear per-frame contacts, carrying the slope angle into the previous-frame slot.
    ///
    /// Facing and the fall-through cooldown survive the reset.
    pub fn reset(&mut self) {
        self.above = false;
        self.below = false;
        self.left = false;
        self.right = false;

        self.ascending_slope = false;
        self.descending_slope = false;
        self.slope_angle_previous_frame = self.slope_angle;
        self.slope_angle = 0.0;
    }

    /// Start ignoring one-way platforms until `until`.
    pub fn begin_fall_through(&mut self, until: f64) {
        self.falling_through_platform = true;
        self.fall_through_until = Some(until);
    }

    /// Clear the fall-through flag once `now` reaches its deadline.
    ///
    /// Returns true when the flag was cleared by this call.
    pub fn expire_fall_through(&mut self, now: f64) -> bool {
        match self.fall_through_until {
            Some(until) if now >= until => {
                self.falling_through_platform = false;
                self.fall_through_until = None;
                true
            }
            _ => false,
        }
    }

    /// Any contact on any face.
    #[inline]
    pub fn has_contact(&self) -> bool {
        self.above || self.below || self.left || self.right
    }

    /// The invariants every resolved frame must hold: at most one slope mode, and never touching
    /// both floor and ceiling in the same call.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        !(self.ascending_slope && self.descending_slope) && !(self.above && self.below)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_carries_slope_angle_and_keeps_cooldown() {
        let mut state = CollisionState::new(Facing::Left);
        state.below = true;
        state.right = true;
        state.ascending_slope = true;
        state.slope_angle = 30.0;
        state.begin_fall_through(2.0);

        state.reset();

        assert!(!state.has_contact());
        assert!(!state.ascending_slope);
        assert_eq!(state.slope_angle, 0.0);
        assert_eq!(state.slope_angle_previous_frame, 30.0);
        assert_eq!(state.facing, Facing::Left);
        assert!(state.falling_through_platform);
    }

    #[test]
    fn fall_through_expires_at_deadline() {
        let mut state = CollisionState::default();
        state.begin_fall_through(1.5);

        assert!(!state.expire_fall_through(1.49));
        assert!(state.falling_through_platform);

        assert!(state.expire_fall_through(1.5));
        assert!(!state.falling_through_platform);
        assert_eq!(state.fall_through_until, None);
    }

    #[test]
    fn consistency_rejects_conflicting_flags() {
        let mut state = CollisionState::default();
        assert!(state.is_consistent());

        state.ascending_slope = true;
        state.descending_slope = true;
        assert!(!state.is_consistent());

        state.descending_slope = false;
        state.above = true;
        state.below = true;
        assert!(!state.is_consistent());
    }
}
