//! Error types surfaced by configuration and host wiring.
//!
//! Per-frame geometric edge cases (no hit, zero-distance hit, conflicting slope classification)
//! are not errors; they are resolved by policy inside the resolver.

use thiserror::Error;

use crate::collision::BodyId;

/// Rejected configuration or geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("skin width must be finite and positive, got {0}")]
    InvalidSkinWidth(f32),

    #[error("{name} must lie in (0, 90] degrees, got {value}")]
    InvalidSlopeAngle { name: &'static str, value: f32 },

    #[error("target ray spacing must be finite and positive, got {0}")]
    InvalidRaySpacing(f32),

    #[error("bounds of {width}x{height} leave no area after the skin inset")]
    DegenerateBounds { width: f32, height: f32 },

    #[error("a platform path needs at least two waypoints, got {0}")]
    TooFewWaypoints(usize),

    #[error("waypoint {index} is not finite")]
    NonFiniteWaypoint { index: usize },

    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidDuration { name: &'static str, value: f64 },

    #[error("platform speed must be finite and non-negative, got {0}")]
    InvalidSpeed(f32),

    #[error("ease amount must lie in [0, {max}], got {value}")]
    InvalidEaseAmount { value: f32, max: f32 },

    #[error("collider of body {body} has an invalid shape: {reason}")]
    InvalidShape { body: BodyId, reason: &'static str },

    #[error("{name} bit index {index} does not fit a 32-bit flag set")]
    FlagOutOfRange { name: &'static str, index: u8 },

    #[error("body {0} has no collider to lay rays out on")]
    MissingBody(BodyId),
}

/// Failure to step a body or platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MotionError {
    #[error("body {0} has no collider in the collision world")]
    UnknownBody(BodyId),
}
