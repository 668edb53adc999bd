/*!
Collision root module.

This module re-exports the submodules that implement the raycast motion resolver and defines the
two services it consumes from the host. The code is split for clarity:

- types:      shared data types (BodyId, Bounds, RayFilter, RayHit, math aliases)
- settings:   default constants and tolerances
- rays:       ray geometry provider (inset origins and spacing)
- state:      per-body collision and slope state
- slope:      slope angle helpers shared by the resolver passes
- kinematic:  body motion resolver (horizontal, vertical and slope passes)
- world:      parry2d-backed collision world implementing the services below
*/

pub mod kinematic;
pub mod rays;
pub mod settings;
pub mod slope;
pub mod state;
pub mod types;
pub mod world;

// Re-export commonly used types.
pub use kinematic::{BodyController, MoveOutcome, MoveRequest, ResolveStep};
pub use rays::{RayGeometry, RayOrigins, RaySpacing};
pub use state::{CollisionState, Facing};
pub use types::{BodyId, Bounds, Iso, Point2, RayFilter, RayHit, Vec2};
pub use world::{ColliderDef, ColliderShapeDef, CollisionWorld};

use crate::error::MotionError;

/// Ray-cast service consumed by the resolver and the platform coordinator.
pub trait RayCaster {
    /// Cast a ray from `origin` along `direction` for up to `max_length` units.
    ///
    /// Must return the nearest hit among colliders accepted by `filter`. `direction` need not be
    /// normalized; the reported distance is measured along the unit direction.
    fn cast(
        &self,
        origin: Point2,
        direction: Vec2,
        max_length: f32,
        filter: RayFilter,
    ) -> Option<RayHit>;
}

/// Transform service: relative translation and bounds of a body.
pub trait BodyTransforms {
    fn translate(&mut self, body: BodyId, delta: Vec2) -> Result<(), MotionError>;

    fn bounds(&self, body: BodyId) -> Option<Bounds>;
}

/// Everything the resolver and the coordinator need from the host.
pub trait PhysicsWorld: RayCaster + BodyTransforms {}

impl<T: RayCaster + BodyTransforms + ?Sized> PhysicsWorld for T {}
