//! Shared fixtures for unit tests: a scripted ray world for exact slope cases and scene builders
//! over [`CollisionWorld`](crate::collision::CollisionWorld).

use crate::{
    bitmask_flags::{Layer, SurfaceTags, Tag},
    collision::{
        BodyId, BodyTransforms, Bounds, ColliderDef, Point2, RayCaster, RayFilter, RayHit, Vec2,
    },
    error::MotionError,
};

pub const LEVEL: BodyId = BodyId(0);
pub const PLAYER: BodyId = BodyId(1);
pub const PLATFORM: BodyId = BodyId(10);
pub const ONE_WAY: BodyId = BodyId(20);

/// Hit on the level with no tags.
pub fn scripted_hit(distance: f32, normal: Vec2) -> RayHit {
    RayHit {
        distance,
        normal,
        tags: SurfaceTags::default(),
        body: LEVEL,
    }
}

struct ScriptedRay {
    direction: Vec2,
    min_length: f32,
    hit: RayHit,
}

/// A single body in a world whose ray answers are scripted per direction.
pub struct ScriptedWorld {
    body: BodyId,
    bounds: Bounds,
    rays: Vec<ScriptedRay>,
    translated: Vec2,
}

impl ScriptedWorld {
    pub fn new(body: BodyId, bounds: Bounds) -> Self {
        Self {
            body,
            bounds,
            rays: Vec::new(),
            translated: Vec2::zeros(),
        }
    }

    /// Answer rays cast along `direction` with `hit`, provided they are at least `min_length`
    /// long and reach the hit distance.
    pub fn with_ray(mut self, direction: Vec2, min_length: f32, hit: RayHit) -> Self {
        self.rays.push(ScriptedRay {
            direction: direction.normalize(),
            min_length,
            hit,
        });
        self
    }

    /// Sum of every translation applied to the body.
    pub fn translated(&self) -> Vec2 {
        self.translated
    }
}

impl RayCaster for ScriptedWorld {
    fn cast(
        &self,
        _origin: Point2,
        direction: Vec2,
        max_length: f32,
        filter: RayFilter,
    ) -> Option<RayHit> {
        let direction = direction.normalize();
        self.rays
            .iter()
            .find(|ray| {
                (ray.direction - direction).norm() < 1.0e-4
                    && max_length >= ray.min_length
                    && ray.hit.distance <= max_length
                    && filter.exclude != Some(ray.hit.body)
            })
            .map(|ray| ray.hit)
    }
}

impl BodyTransforms for ScriptedWorld {
    fn translate(&mut self, body: BodyId, delta: Vec2) -> Result<(), MotionError> {
        if body != self.body {
            return Err(MotionError::UnknownBody(body));
        }
        self.bounds = Bounds::new(self.bounds.min + delta, self.bounds.max + delta);
        self.translated += delta;
        Ok(())
    }

    fn bounds(&self, body: BodyId) -> Option<Bounds> {
        (body == self.body).then_some(self.bounds)
    }
}

/// Wide level floor with its top face at `top`.
pub fn floor(top: f32) -> ColliderDef {
    ColliderDef::cuboid(LEVEL, Point2::new(0.0, top - 0.5), Vec2::new(50.0, 0.5))
}

/// Tall level wall whose left face sits at `face_x`, standing on y = 0.
pub fn wall(face_x: f32) -> ColliderDef {
    ColliderDef::cuboid(LEVEL, Point2::new(face_x + 0.5, 5.0), Vec2::new(0.5, 5.0))
}

/// Thin one-way platform six units wide with its top face at `top`.
pub fn one_way_platform(top: f32) -> ColliderDef {
    ColliderDef::cuboid(ONE_WAY, Point2::new(0.0, top - 0.25), Vec2::new(3.0, 0.25))
        .with_tag(Tag::THROUGH_PLATFORM)
}

/// Box on the passenger layer, as riders are.
pub fn body_box(id: BodyId, center: Point2, half_extents: Vec2) -> ColliderDef {
    ColliderDef::cuboid(id, center, half_extents).on_layer(Layer::PASSENGER)
}
