//! In-memory collision world answering ray casts against parry2d shapes.
//!
//! This is the reference implementation of the ray-cast and transform services the resolver and
//! platform coordinator consume. Hosts that already own a broad phase can implement
//! [`RayCaster`] and [`BodyTransforms`] on it instead.
//!
//! Design notes
//! - A parry `Bvh` over world-space AABBs yields candidates; leaf `i` is `colliders[i]`.
//! - Candidates are narrowed in insertion order and the nearest hit wins; ties keep the collider
//!   inserted first, so results are deterministic for a given insertion order.
//! - Rays are cast in solid mode: a ray that starts inside a collider reports a hit at distance
//!   zero with a zero normal.
//! - Each collider belongs to one body identity. Translating a body moves all of its colliders
//!   and updates their leaves in place.

use rapier2d::parry::{
    bounding_volume::Aabb,
    partitioning::{Bvh, BvhBuildStrategy},
    query::Ray,
    shape::SharedShape,
};
use serde::{Deserialize, Serialize};

use crate::{
    bitmask_flags::{FlagBitmask, Layer, SurfaceTags, Tag},
    collision::{
        BodyTransforms, RayCaster,
        types::{BodyId, Bounds, Iso, Point2, RayFilter, RayHit, Vec2},
    },
    error::{ConfigError, MotionError},
};

/// Supported collider shapes, with points in the collider's local frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColliderShapeDef {
    /// Axis-aligned box.
    Cuboid { half_extents: Vec2 },
    /// Triangle, typically a ramp.
    Triangle { a: Point2, b: Point2, c: Point2 },
    /// Convex hull of the given points.
    ConvexPolygon { points: Vec<Point2> },
    /// Zero-thickness segment.
    Segment { a: Point2, b: Point2 },
}

/// Schema-agnostic definition of one collider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColliderDef {
    pub body: BodyId,
    /// World-space position of the shape's local origin.
    pub translation: Vec2,
    pub shape: ColliderShapeDef,
    #[serde(default = "ground_layer")]
    pub layer: Layer,
    #[serde(default)]
    pub tags: SurfaceTags,
}

fn ground_layer() -> Layer {
    Layer::GROUND
}

impl ColliderDef {
    /// Box collider on the ground layer.
    pub fn cuboid(body: BodyId, center: Point2, half_extents: Vec2) -> Self {
        Self {
            body,
            translation: center.coords,
            shape: ColliderShapeDef::Cuboid { half_extents },
            layer: Layer::GROUND,
            tags: SurfaceTags::default(),
        }
    }

    /// Triangle collider on the ground layer with world-space corners.
    pub fn triangle(body: BodyId, a: Point2, b: Point2, c: Point2) -> Self {
        Self {
            body,
            translation: Vec2::zeros(),
            shape: ColliderShapeDef::Triangle { a, b, c },
            layer: Layer::GROUND,
            tags: SurfaceTags::default(),
        }
    }

    pub fn on_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.add(tag);
        self
    }
}

#[derive(Debug)]
struct WorldCollider {
    body: BodyId,
    layer: Layer,
    tags: SurfaceTags,
    position: Iso,
    shape: SharedShape,
}

impl WorldCollider {
    #[inline]
    fn aabb(&self) -> Aabb {
        self.shape.compute_aabb(&self.position)
    }
}

/// Colliders of every body in the scene.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    colliders: Vec<WorldCollider>,
    /// Leaf `i` bounds `colliders[i]`.
    bvh: Bvh,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a world from collider definitions, in the given order.
    pub fn build(defs: impl IntoIterator<Item = ColliderDef>) -> Result<Self, ConfigError> {
        let mut world = Self::new();
        for def in defs {
            world.insert(def)?;
        }
        Ok(world)
    }

    /// Add one collider. Invalid shapes are rejected and leave the world unchanged.
    pub fn insert(&mut self, def: ColliderDef) -> Result<(), ConfigError> {
        if !def.layer.fits_storage() {
            return Err(ConfigError::FlagOutOfRange {
                name: "layer",
                index: def.layer.bit_index(),
            });
        }
        if !(def.translation.x.is_finite() && def.translation.y.is_finite()) {
            return Err(ConfigError::InvalidShape {
                body: def.body,
                reason: "translation is not finite",
            });
        }
        let shape = shape_from_def(def.body, &def.shape)?;
        let collider = WorldCollider {
            body: def.body,
            layer: def.layer,
            tags: def.tags,
            position: Iso::translation(def.translation.x, def.translation.y),
            shape,
        };
        self.bvh.insert(collider.aabb(), self.colliders.len() as u32);
        self.colliders.push(collider);
        Ok(())
    }

    /// Remove every collider of `body`, returning how many were removed.
    pub fn remove_body(&mut self, body: BodyId) -> usize {
        let before = self.colliders.len();
        self.colliders.retain(|c| c.body != body);
        let removed = before - self.colliders.len();
        if removed > 0 {
            // Leaf indices follow vector positions, which just shifted.
            self.rebuild_bvh();
        }
        removed
    }

    pub fn contains_body(&self, body: BodyId) -> bool {
        self.colliders.iter().any(|c| c.body == body)
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    fn rebuild_bvh(&mut self) {
        let aabbs: Vec<Aabb> = self.colliders.iter().map(WorldCollider::aabb).collect();
        self.bvh = Bvh::from_leaves(BvhBuildStrategy::Binned, &aabbs);
    }

    /// Indices of colliders whose AABB meets the ray segment, in insertion order.
    fn candidates(&self, ray: &Ray, max_length: f32) -> Vec<usize> {
        if self.bvh.is_empty() {
            return Vec::new();
        }
        // Nothing lies farther than the root's far corner, so unbounded rays stay finite.
        let root = self.bvh.root_aabb();
        let reach = (ray.origin - root.center()).norm() + root.half_extents().norm();
        let end = ray.point_at(max_length.min(reach));
        let swept = Aabb::new(ray.origin.inf(&end), ray.origin.sup(&end));

        let mut found: Vec<usize> = self
            .bvh
            .intersect_aabb(&swept)
            .map(|leaf| leaf as usize)
            .collect();
        found.sort_unstable();
        found
    }
}

impl RayCaster for CollisionWorld {
    fn cast(
        &self,
        origin: Point2,
        direction: Vec2,
        max_length: f32,
        filter: RayFilter,
    ) -> Option<RayHit> {
        if !(max_length >= 0.0) {
            return None;
        }
        let dir = direction.try_normalize(f32::EPSILON)?;
        let ray = Ray::new(origin, dir);

        let mut best: Option<RayHit> = None;
        for index in self.candidates(&ray, max_length) {
            let collider = &self.colliders[index];
            if filter.exclude == Some(collider.body) || !filter.mask.has(collider.layer) {
                continue;
            }
            let Some(hit) =
                collider
                    .shape
                    .cast_ray_and_get_normal(&collider.position, &ray, max_length, true)
            else {
                continue;
            };
            if best.is_none_or(|b| hit.time_of_impact < b.distance) {
                best = Some(RayHit {
                    distance: hit.time_of_impact,
                    normal: hit.normal,
                    tags: collider.tags,
                    body: collider.body,
                });
            }
        }
        best
    }
}

impl BodyTransforms for CollisionWorld {
    fn translate(&mut self, body: BodyId, delta: Vec2) -> Result<(), MotionError> {
        let mut found = false;
        for (index, collider) in self.colliders.iter_mut().enumerate() {
            if collider.body != body {
                continue;
            }
            collider.position.translation.vector += delta;
            self.bvh.insert(collider.aabb(), index as u32);
            found = true;
        }
        if found {
            Ok(())
        } else {
            Err(MotionError::UnknownBody(body))
        }
    }

    fn bounds(&self, body: BodyId) -> Option<Bounds> {
        self.colliders
            .iter()
            .filter(|c| c.body == body)
            .map(|c| {
                let aabb = c.aabb();
                Bounds::new(aabb.mins, aabb.maxs)
            })
            .reduce(|a, b| a.merged(&b))
    }
}

/// Build a parry shape from a definition, rejecting degenerate input.
fn shape_from_def(body: BodyId, def: &ColliderShapeDef) -> Result<SharedShape, ConfigError> {
    let invalid = |reason| ConfigError::InvalidShape { body, reason };
    let finite = |p: &Point2| p.x.is_finite() && p.y.is_finite();

    match def {
        ColliderShapeDef::Cuboid { half_extents } => {
            if half_extents.x > 0.0
                && half_extents.y > 0.0
                && half_extents.x.is_finite()
                && half_extents.y.is_finite()
            {
                Ok(SharedShape::cuboid(half_extents.x, half_extents.y))
            } else {
                Err(invalid("cuboid half extents must be finite and positive"))
            }
        }
        ColliderShapeDef::Triangle { a, b, c } => {
            if ![a, b, c].into_iter().all(finite) {
                return Err(invalid("triangle corner is not finite"));
            }
            let area = (b - a).perp(&(c - a));
            if area.abs() <= f32::EPSILON {
                return Err(invalid("triangle has no area"));
            }
            Ok(SharedShape::triangle(*a, *b, *c))
        }
        ColliderShapeDef::ConvexPolygon { points } => {
            if !points.iter().all(finite) {
                return Err(invalid("polygon point is not finite"));
            }
            SharedShape::convex_hull(points).ok_or_else(|| invalid("polygon hull is degenerate"))
        }
        ColliderShapeDef::Segment { a, b } => {
            if !(finite(a) && finite(b)) {
                return Err(invalid("segment end is not finite"));
            }
            if (b - a).norm_squared() <= f32::EPSILON {
                return Err(invalid("segment has no length"));
            }
            Ok(SharedShape::segment(*a, *b))
        }
    }
}
