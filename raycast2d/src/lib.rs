pub mod bitmask_flags;
pub mod clock;
pub mod collision;
pub mod config;
pub mod error;
pub mod platform;

#[cfg(test)]
mod test_support;

pub use bitmask_flags::{Layer, LayerMask, SurfaceTags, Tag};
pub use clock::{SimClock, Tick};
pub use collision::{
    BodyController, BodyId, BodyTransforms, Bounds, ColliderDef, ColliderShapeDef,
    CollisionState, CollisionWorld, Facing, MoveOutcome, MoveRequest, PhysicsWorld, Point2,
    RayCaster, RayFilter, RayHit, ResolveStep, Vec2,
};
pub use config::{BodyConfig, PlatformConfig, RayDensity};
pub use error::{ConfigError, MotionError};
pub use platform::{
    PassengerMovement, PassengerRegistry, PlatformController, PlatformStep, RiderClaims,
    TraversalPhase, WaypointPath,
};
