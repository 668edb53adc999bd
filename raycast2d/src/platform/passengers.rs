use rapier2d::parry::utils::hashset::HashSet;

use crate::{
    bitmask_flags::LayerMask,
    collision::{
        BodyId, RayCaster, RayFilter, ResolveStep, Vec2,
        rays::{RayGeometry, RayOrigins},
        slope::sign,
    },
};

/// Riders already claimed this frame. Shared by every platform stepped in the same frame so a
/// rider touching two platforms is only carried by the first.
pub type RiderClaims = HashSet<BodyId>;

/// Displacement owed to one rider this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PassengerMovement {
    pub rider: BodyId,
    pub velocity: Vec2,
    /// The rider counts as grounded while it is moved.
    pub standing_on_platform: bool,
    /// Move the rider before the platform translates rather than after.
    pub move_before_platform: bool,
}

/// Host-side lookup of rider resolvers by body identity.
///
/// Slots are opaque to the platform. It caches them and re-validates each with `rider_mut`, so a
/// registry that reorders riders only costs a fresh `locate`.
pub trait PassengerRegistry {
    type Rider: ResolveStep;

    fn locate(&self, id: BodyId) -> Option<usize>;

    /// The rider at `slot`, provided it still has identity `id`.
    fn rider_mut(&mut self, slot: usize, id: BodyId) -> Option<&mut Self::Rider>;
}

impl<R: ResolveStep> PassengerRegistry for [R] {
    type Rider = R;

    fn locate(&self, id: BodyId) -> Option<usize> {
        self.iter().position(|rider| rider.id() == id)
    }

    fn rider_mut(&mut self, slot: usize, id: BodyId) -> Option<&mut R> {
        self.get_mut(slot).filter(|rider| rider.id() == id)
    }
}

impl<R: ResolveStep> PassengerRegistry for Vec<R> {
    type Rider = R;

    fn locate(&self, id: BodyId) -> Option<usize> {
        self.as_slice().locate(id)
    }

    fn rider_mut(&mut self, slot: usize, id: BodyId) -> Option<&mut R> {
        self.as_mut_slice().rider_mut(slot, id)
    }
}

/// Detect riders for a platform about to move by `velocity` and compute what each one is owed.
///
/// Three fans run in order and the first one to see a rider claims it, unless `claimed` already
/// holds it from an earlier platform this frame:
/// - along the vertical motion, pushing riders out of the way (and carrying them sideways when
///   the platform rises under them);
/// - along the horizontal motion, pushing riders sideways with a small downward nudge;
/// - a short upward fan from the top edge when the platform sinks or only slides, carrying riders
///   after the platform has moved.
pub fn detect_passengers<W: RayCaster + ?Sized>(
    world: &W,
    platform: BodyId,
    geometry: &RayGeometry,
    origins: &RayOrigins,
    passenger_mask: LayerMask,
    velocity: Vec2,
    claimed: &mut RiderClaims,
) -> Vec<PassengerMovement> {
    let skin = geometry.skin_width;
    let filter = RayFilter::new(passenger_mask).excluding(platform);
    let direction_x = sign(velocity.x);
    let direction_y = sign(velocity.y);
    let mut movements: Vec<PassengerMovement> = Vec::new();

    if velocity.y != 0.0 {
        let ray_length = velocity.y.abs() + skin;
        for i in 0..geometry.vertical_rays {
            let origin = origins.left_toward(direction_y)
                + Vec2::x() * (geometry.spacing.vertical * i as f32);
            if let Some(hit) = world.cast(origin, Vec2::y() * direction_y, ray_length, filter) {
                let rising = direction_y > 0.0;
                let push_x = if rising { velocity.x } else { 0.0 };
                let push_y = velocity.y - (hit.distance - skin) * direction_y;
                claim(
                    &mut movements,
                    claimed,
                    PassengerMovement {
                        rider: hit.body,
                        velocity: Vec2::new(push_x, push_y),
                        standing_on_platform: rising,
                        move_before_platform: true,
                    },
                );
            }
        }
    }

    if velocity.x != 0.0 {
        let ray_length = velocity.x.abs() + skin;
        for i in 0..geometry.horizontal_rays {
            let origin = origins.bottom_toward(direction_x)
                + Vec2::y() * (geometry.spacing.horizontal * i as f32);
            if let Some(hit) = world.cast(origin, Vec2::x() * direction_x, ray_length, filter) {
                let push_x = velocity.x - (hit.distance - skin) * direction_x;
                claim(
                    &mut movements,
                    claimed,
                    PassengerMovement {
                        rider: hit.body,
                        // Keeps a pushed rider pressed to the ground so it can still jump.
                        velocity: Vec2::new(push_x, -skin),
                        standing_on_platform: false,
                        move_before_platform: true,
                    },
                );
            }
        }
    }

    if direction_y < 0.0 || (velocity.y == 0.0 && velocity.x != 0.0) {
        let ray_length = skin * 2.0;
        for i in 0..geometry.vertical_rays {
            let origin = origins.top_left + Vec2::x() * (geometry.spacing.vertical * i as f32);
            if let Some(hit) = world.cast(origin, Vec2::y(), ray_length, filter) {
                claim(
                    &mut movements,
                    claimed,
                    PassengerMovement {
                        rider: hit.body,
                        velocity,
                        standing_on_platform: true,
                        move_before_platform: false,
                    },
                );
            }
        }
    }

    movements
}

/// First claim on a rider wins.
fn claim(
    movements: &mut Vec<PassengerMovement>,
    claimed: &mut RiderClaims,
    movement: PassengerMovement,
) {
    if claimed.insert(movement.rider) {
        movements.push(movement);
    }
}
