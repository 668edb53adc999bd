/*!
Raycast controller settings and tolerances.

These constants centralize the parameters used by the ray geometry provider, the body motion
resolver and the moving platform coordinator. They are the defaults behind `BodyConfig` and
`PlatformConfig`; override them per instance from your game data.

Notes
- Distances are in world units, time in seconds, angles in degrees.
*/

/// Inward margin subtracted from a collider's bounds before casting rays.
/// Rays that start exactly on a surface produce unreliable zero-distance hits.
pub const DEFAULT_SKIN_WIDTH: f32 = 0.015;

/// Fewest rays fired along any edge. Two rays cover both corners.
pub const MIN_RAY_COUNT: u32 = 2;

/// Target distance between neighbouring rays when counts are derived from the box size.
pub const DEFAULT_RAY_SPACING: f32 = 0.25;

/// Steepest slope (angle between surface normal and +Y) a body may walk up.
pub const DEFAULT_MAX_ASCEND_ANGLE: f32 = 80.0;

/// Steepest slope a body may stick to while walking down.
pub const DEFAULT_MAX_DESCEND_ANGLE: f32 = 80.0;

/// How long a body ignores one-way platforms after an explicit drop request.
pub const DEFAULT_FALL_THROUGH_COOLDOWN: f64 = 0.5;

/// Tolerance used when comparing slope angles between rays and frames.
/// A surface only counts as a slope when its angle exceeds this value.
pub const SLOPE_ANGLE_EPS: f32 = 1.0e-3;

/// Vertical intent strictly below this value is read as an explicit drop request.
pub const DROP_INTENT_THRESHOLD: f32 = -0.5;

/// Default platform travel speed (units per second).
pub const DEFAULT_PLATFORM_SPEED: f32 = 1.5;

/// Default pause at each waypoint (seconds).
pub const DEFAULT_PLATFORM_WAIT_TIME: f64 = 0.5;

/// Default easing strength. 0 is linear; the valid range is [0, MAX_EASE_AMOUNT].
pub const DEFAULT_EASE_AMOUNT: f32 = 0.5;

/// Upper bound for the easing strength.
pub const MAX_EASE_AMOUNT: f32 = 2.0;

/// Frames a cached rider may go unseen before its cache entry is dropped.
pub const DEFAULT_RIDER_EVICTION_FRAMES: u64 = 60;

/// Largest simulation step accepted by the clock (seconds).
/// A stalled host must not teleport bodies through geometry.
pub const MAX_FRAME_DT: f32 = 0.125;
