/*!
Core collision types and math aliases shared by the collision submodules.

This module intentionally contains no algorithms. It defines the data types exchanged between:
- the ray-cast service (any broad phase implementing `RayCaster`)
- the ray geometry provider (bounds, origins, spacing)
- the body motion resolver and the moving platform coordinator
*/

use std::fmt;

use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::bitmask_flags::{LayerMask, SurfaceTags};

/// Common math aliases for clarity and consistency.
pub type Vec2 = na::Vector2<f32>;
pub type Point2 = na::Point2<f32>;
pub type Iso = na::Isometry2<f32>;

/// Identity of a body owning one or more colliders.
///
/// Static level geometry gets an identity too; rays report it as the hit identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// World-space axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Point2,
    pub max: Point2,
}

impl Bounds {
    #[inline]
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Box of `half_extents` centered at `center`.
    #[inline]
    pub fn from_center(center: Point2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Point2 {
        na::center(&self.min, &self.max)
    }

    /// Grow (positive) or shrink (negative) the box by `amount` on every side.
    #[inline]
    pub fn expanded(&self, amount: f32) -> Self {
        let delta = Vec2::new(amount, amount);
        Self {
            min: self.min - delta,
            max: self.max + delta,
        }
    }

    /// Smallest box containing both `self` and `other`.
    #[inline]
    pub fn merged(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Strict overlap test: boxes that only touch do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Which colliders a ray may report.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayFilter {
    /// Only colliders on these layers are considered.
    pub mask: LayerMask,
    /// Colliders of this body are skipped (the caster itself).
    pub exclude: Option<BodyId>,
}

impl RayFilter {
    #[inline]
    pub fn new(mask: LayerMask) -> Self {
        Self {
            mask,
            exclude: None,
        }
    }

    #[inline]
    pub fn excluding(mut self, body: BodyId) -> Self {
        self.exclude = Some(body);
        self
    }
}

/// Nearest hit reported by a ray cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin to the hit point, along the (unit) ray direction.
    pub distance: f32,
    /// Surface normal at the hit point. Zero when the ray started inside the collider.
    pub normal: Vec2,
    /// Tags of the surface that was hit.
    pub tags: SurfaceTags,
    /// Body owning the collider that was hit.
    pub body: BodyId,
}
