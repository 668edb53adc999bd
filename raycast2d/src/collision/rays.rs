/*!
Ray geometry provider.

Pure geometry: from a body's bounds it derives the four inset corner points rays are fired from,
and the spacing between neighbouring rays along each edge. No collision logic lives here.

- Horizontal rays travel along ±X and are spread along the vertical edges
  (`horizontal_spacing` is a vertical distance).
- Vertical rays travel along ±Y and are spread along the horizontal edges
  (`vertical_spacing` is a horizontal distance).
*/

use crate::{
    collision::{
        settings::MIN_RAY_COUNT,
        types::{Bounds, Point2},
    },
    config::RayDensity,
    error::ConfigError,
};

/// The four corners rays start from, inset by the skin width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayOrigins {
    pub top_left: Point2,
    pub top_right: Point2,
    pub bottom_left: Point2,
    pub bottom_right: Point2,
}

impl RayOrigins {
    /// Bottom corner on the side `direction_x` points to (+1 right, -1 left).
    #[inline]
    pub fn bottom_toward(&self, direction_x: f32) -> Point2 {
        if direction_x < 0.0 {
            self.bottom_left
        } else {
            self.bottom_right
        }
    }

    /// Left corner of the edge `direction_y` points to (+1 top, -1 bottom).
    #[inline]
    pub fn left_toward(&self, direction_y: f32) -> Point2 {
        if direction_y < 0.0 {
            self.bottom_left
        } else {
            self.top_left
        }
    }
}

/// Distance between neighbouring rays on each axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RaySpacing {
    /// Vertical distance between horizontal rays.
    pub horizontal: f32,
    /// Horizontal distance between vertical rays.
    pub vertical: f32,
}

/// Compute the inset corner points of `bounds` (already shrunk by the skin width).
pub fn compute_origins(bounds: &Bounds) -> RayOrigins {
    RayOrigins {
        top_left: Point2::new(bounds.min.x, bounds.max.y),
        top_right: Point2::new(bounds.max.x, bounds.max.y),
        bottom_left: Point2::new(bounds.min.x, bounds.min.y),
        bottom_right: Point2::new(bounds.max.x, bounds.min.y),
    }
}

/// Compute ray spacing for the given counts, clamping both to at least [`MIN_RAY_COUNT`].
///
/// A zero-length edge yields zero spacing: every ray on that edge coincides, which behaves as a
/// single ray pair.
pub fn compute_spacing(bounds: &Bounds, horizontal_rays: u32, vertical_rays: u32) -> RaySpacing {
    let horizontal_rays = horizontal_rays.max(MIN_RAY_COUNT);
    let vertical_rays = vertical_rays.max(MIN_RAY_COUNT);

    RaySpacing {
        horizontal: bounds.height().max(0.0) / (horizontal_rays - 1) as f32,
        vertical: bounds.width().max(0.0) / (vertical_rays - 1) as f32,
    }
}

/// Derive ray counts from a target distance between rays, clamped to [`MIN_RAY_COUNT`].
pub fn counts_for_spacing(bounds: &Bounds, target_spacing: f32) -> (u32, u32) {
    let count = |length: f32| {
        let rays = (length.max(0.0) / target_spacing).round();
        if rays.is_finite() && rays < u32::MAX as f32 {
            (rays as u32).max(MIN_RAY_COUNT)
        } else {
            MIN_RAY_COUNT
        }
    };
    (count(bounds.height()), count(bounds.width()))
}

/// Ray layout of one body: counts, spacing and skin width.
///
/// Spacing depends only on the box size and the configured density, so it is computed once and
/// reused; call [`RayGeometry::new`] again when either changes. Origins move with the body and are
/// recomputed every frame with [`RayGeometry::origins`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayGeometry {
    pub skin_width: f32,
    pub horizontal_rays: u32,
    pub vertical_rays: u32,
    pub spacing: RaySpacing,
}

impl RayGeometry {
    /// Lay out rays for a collider with world bounds `collider_bounds`.
    ///
    /// Fails when the box has no area left after shrinking it by the skin width.
    pub fn new(
        collider_bounds: &Bounds,
        density: RayDensity,
        skin_width: f32,
    ) -> Result<Self, ConfigError> {
        let inset = collider_bounds.expanded(-skin_width);
        if !(inset.width() > 0.0 && inset.height() > 0.0) {
            return Err(ConfigError::DegenerateBounds {
                width: collider_bounds.width(),
                height: collider_bounds.height(),
            });
        }

        let (horizontal_rays, vertical_rays) = match density {
            RayDensity::Counts {
                horizontal,
                vertical,
            } => (horizontal.max(MIN_RAY_COUNT), vertical.max(MIN_RAY_COUNT)),
            RayDensity::Spacing { target } => counts_for_spacing(&inset, target),
        };

        Ok(Self {
            skin_width,
            horizontal_rays,
            vertical_rays,
            spacing: compute_spacing(&inset, horizontal_rays, vertical_rays),
        })
    }

    /// Inset corner points for the collider's current bounds.
    #[inline]
    pub fn origins(&self, collider_bounds: &Bounds) -> RayOrigins {
        compute_origins(&collider_bounds.expanded(-self.skin_width))
    }
}
