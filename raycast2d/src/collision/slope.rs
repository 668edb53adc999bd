//! Slope math shared by the resolver passes. Angles are in degrees.

use super::{settings::SLOPE_ANGLE_EPS, types::Vec2};

/// Sign that treats zero as positive, so a body at rest keeps probing to the right.
#[inline]
pub fn sign(value: f32) -> f32 {
    if value < 0.0 { -1.0 } else { 1.0 }
}

/// Angle between a surface normal and +Y. A zero normal reads as flat.
#[inline]
pub fn surface_angle(normal: Vec2) -> f32 {
    normal.angle(&Vec2::y()).to_degrees()
}

/// A surface only counts as a slope when its angle exceeds the comparison tolerance.
#[inline]
pub fn is_slope(angle: f32) -> bool {
    angle > SLOPE_ANGLE_EPS
}

#[inline]
pub fn angles_equal(a: f32, b: f32) -> bool {
    (a - b).abs() <= SLOPE_ANGLE_EPS
}

#[inline]
pub fn tan_deg(angle: f32) -> f32 {
    angle.to_radians().tan()
}

/// Redirect horizontal travel up an incline.
///
/// Returns `None` when the body already rises faster than the slope would lift it (a jump).
pub fn ascend(velocity: Vec2, angle: f32) -> Option<Vec2> {
    let move_distance = velocity.x.abs();
    let (sin, cos) = angle.to_radians().sin_cos();
    let climb_y = sin * move_distance;
    if velocity.y > climb_y {
        return None;
    }
    Some(Vec2::new(cos * move_distance * sign(velocity.x), climb_y))
}

/// Redirect horizontal travel down an incline, adding the drop to the vertical component.
pub fn descend(velocity: Vec2, angle: f32) -> Vec2 {
    let move_distance = velocity.x.abs();
    let (sin, cos) = angle.to_radians().sin_cos();
    Vec2::new(
        cos * move_distance * sign(velocity.x),
        velocity.y - sin * move_distance,
    )
}
