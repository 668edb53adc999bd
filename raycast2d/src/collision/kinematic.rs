use super::{
    BodyTransforms, PhysicsWorld,
    rays::{RayGeometry, RayOrigins},
    settings::DROP_INTENT_THRESHOLD,
    slope,
    state::{CollisionState, Facing},
    types::{BodyId, RayFilter, Vec2},
};
use crate::{
    clock::Tick,
    config::BodyConfig,
    error::{ConfigError, MotionError},
};

/// Input to one resolution call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveRequest {
    /// Requested displacement for this step (world units, already scaled by dt).
    pub velocity: Vec2,
    /// Raw directional intent; only `intent.y` is read, as a drop-through request.
    pub intent: Vec2,
    /// Set by a carrying platform: the body counts as grounded whatever the rays report.
    pub standing_on_platform: bool,
}

impl MoveRequest {
    #[inline]
    pub fn new(velocity: Vec2) -> Self {
        Self {
            velocity,
            ..Self::default()
        }
    }

    #[inline]
    pub fn with_intent(mut self, intent: Vec2) -> Self {
        self.intent = intent;
        self
    }

    #[inline]
    pub fn on_platform(mut self, standing: bool) -> Self {
        self.standing_on_platform = standing;
        self
    }
}

/// Result of one resolution call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveOutcome {
    /// Displacement that was actually applied to the body.
    pub applied: Vec2,
    /// Collision state after the call.
    pub state: CollisionState,
}

/// Something that can resolve and apply one requested displacement.
///
/// Standalone bodies and platform-carried riders go through the same call.
pub trait ResolveStep {
    fn id(&self) -> BodyId;

    fn resolve_step<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        tick: Tick,
        request: MoveRequest,
    ) -> Result<MoveOutcome, MotionError>;
}

/// Raycast motion resolver for one axis-aligned body.
///
/// Owns the body's ray layout and its [`CollisionState`]; nothing else writes that state.
#[derive(Clone, Debug)]
pub struct BodyController {
    id: BodyId,
    config: BodyConfig,
    geometry: RayGeometry,
    state: CollisionState,
}

impl BodyController {
    /// Validate `config` and lay rays out over the body's current bounds.
    pub fn new<W: BodyTransforms + ?Sized>(
        id: BodyId,
        config: BodyConfig,
        world: &W,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let bounds = world.bounds(id).ok_or(ConfigError::MissingBody(id))?;
        let geometry = RayGeometry::new(&bounds, config.rays, config.skin_width)?;
        let facing = if config.starts_facing_right {
            Facing::Right
        } else {
            Facing::Left
        };

        Ok(Self {
            id,
            config,
            geometry,
            state: CollisionState::new(facing),
        })
    }

    /// Recompute ray counts and spacing after the collider or the ray density changed.
    pub fn refresh_geometry<W: BodyTransforms + ?Sized>(
        &mut self,
        world: &W,
    ) -> Result<(), ConfigError> {
        let bounds = world
            .bounds(self.id)
            .ok_or(ConfigError::MissingBody(self.id))?;
        self.geometry = RayGeometry::new(&bounds, self.config.rays, self.config.skin_width)?;
        Ok(())
    }

    /// Replace the configuration, re-deriving the ray layout.
    pub fn set_config<W: BodyTransforms + ?Sized>(
        &mut self,
        config: BodyConfig,
        world: &W,
    ) -> Result<(), ConfigError> {
        config.validate()?;
        let previous = std::mem::replace(&mut self.config, config);
        if let Err(err) = self.refresh_geometry(world) {
            self.config = previous;
            return Err(err);
        }
        Ok(())
    }

    #[inline]
    pub fn id(&self) -> BodyId {
        self.id
    }

    #[inline]
    pub fn config(&self) -> &BodyConfig {
        &self.config
    }

    #[inline]
    pub fn geometry(&self) -> &RayGeometry {
        &self.geometry
    }

    /// Collision state left by the latest resolution call.
    #[inline]
    pub fn state(&self) -> &CollisionState {
        &self.state
    }

    /// Resolve `request` against the world and translate the body by the corrected displacement.
    pub fn move_body<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        tick: Tick,
        request: MoveRequest,
    ) -> Result<MoveOutcome, MotionError> {
        let bounds = world
            .bounds(self.id)
            .ok_or(MotionError::UnknownBody(self.id))?;

        if self.state.expire_fall_through(tick.now) {
            log::debug!("body {} stops falling through platforms", self.id);
        }

        // A body at rest keeps last frame's contacts.
        if request.velocity == Vec2::zeros() {
            if request.standing_on_platform {
                self.force_grounded();
            }
            return Ok(MoveOutcome {
                applied: Vec2::zeros(),
                state: self.state,
            });
        }

        let origins = self.geometry.origins(&bounds);
        self.state.reset();
        self.state.previous_velocity = request.velocity;

        let mut velocity = request.velocity;
        if velocity.x != 0.0 {
            self.state.facing = Facing::from_velocity(velocity.x);
        }

        if velocity.y < 0.0 {
            self.descend_slope(world, &origins, &mut velocity);
        }

        self.horizontal_collisions(world, &origins, &mut velocity);

        if velocity.y != 0.0 {
            self.vertical_collisions(world, tick, &origins, &mut velocity, request.intent);
        }

        world.translate(self.id, velocity)?;

        if request.standing_on_platform {
            self.force_grounded();
        }

        log::trace!(
            "body {} requested {:?} applied {:?}",
            self.id,
            request.velocity,
            velocity
        );

        Ok(MoveOutcome {
            applied: velocity,
            state: self.state,
        })
    }

    fn force_grounded(&mut self) {
        self.state.below = true;
        self.state.above = false;
    }

    #[inline]
    fn filter(&self) -> RayFilter {
        RayFilter::new(self.config.collision_mask).excluding(self.id)
    }

    /// Cast straight down from the trailing bottom corner and hug a slope falling away in the
    /// direction of travel.
    fn descend_slope<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &W,
        origins: &RayOrigins,
        velocity: &mut Vec2,
    ) {
        let direction_x = slope::sign(velocity.x);
        let origin = origins.bottom_toward(-direction_x);
        let Some(hit) = world.cast(origin, -Vec2::y(), f32::MAX, self.filter()) else {
            return;
        };
        if self.state.falling_through_platform && hit.tags.has(self.config.one_way_tag) {
            return;
        }

        let angle = slope::surface_angle(hit.normal);
        if !slope::is_slope(angle) || angle > self.config.max_descend_angle {
            return;
        }
        if slope::sign(hit.normal.x) != direction_x {
            return;
        }
        let gap = hit.distance - self.geometry.skin_width;
        if gap > slope::tan_deg(angle) * velocity.x.abs() {
            return;
        }

        *velocity = slope::descend(*velocity, angle);
        self.state.slope_angle = angle;
        self.state.descending_slope = true;
        self.state.below = true;
        log::trace!("body {} descends a {angle:.1} degree slope", self.id);
    }

    fn horizontal_collisions<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &W,
        origins: &RayOrigins,
        velocity: &mut Vec2,
    ) {
        let skin = self.geometry.skin_width;
        let direction_x = self.state.facing.sign();
        let direction = Vec2::x() * direction_x;
        let mut ray_length = if velocity.x.abs() < skin {
            2.0 * skin
        } else {
            velocity.x.abs() + skin
        };

        for i in 0..self.geometry.horizontal_rays {
            let origin = origins.bottom_toward(direction_x)
                + Vec2::y() * (self.geometry.spacing.horizontal * i as f32);
            let Some(hit) = world.cast(origin, direction, ray_length, self.filter()) else {
                continue;
            };
            // Already touching: re-clamping here would glue the body to the wall.
            if hit.distance == 0.0 {
                continue;
            }

            let angle = slope::surface_angle(hit.normal);
            if i == 0 && slope::is_slope(angle) && angle <= self.config.max_ascend_angle {
                if self.state.descending_slope {
                    self.state.descending_slope = false;
                    *velocity = self.state.previous_velocity;
                }
                let mut distance_to_slope_start = 0.0;
                if !slope::angles_equal(angle, self.state.slope_angle_previous_frame) {
                    distance_to_slope_start = hit.distance - skin;
                    velocity.x -= distance_to_slope_start * direction_x;
                }
                self.ascend_slope(velocity, angle);
                velocity.x += distance_to_slope_start * direction_x;
            }

            if !self.state.ascending_slope || angle > self.config.max_ascend_angle {
                velocity.x = (hit.distance - skin) * direction_x;
                ray_length = hit.distance;

                if self.state.ascending_slope {
                    velocity.y = slope::tan_deg(self.state.slope_angle) * velocity.x.abs();
                }

                self.state.left = direction_x < 0.0;
                self.state.right = direction_x > 0.0;
            }
        }
    }

    fn ascend_slope(&mut self, velocity: &mut Vec2, angle: f32) {
        let Some(climbed) = slope::ascend(*velocity, angle) else {
            return;
        };
        *velocity = climbed;
        self.state.slope_angle = angle;
        self.state.ascending_slope = true;
        self.state.below = true;
        log::trace!("body {} ascends a {angle:.1} degree slope", self.id);
    }

    fn vertical_collisions<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &W,
        tick: Tick,
        origins: &RayOrigins,
        velocity: &mut Vec2,
        intent: Vec2,
    ) {
        let skin = self.geometry.skin_width;
        let direction_y = slope::sign(velocity.y);
        let direction = Vec2::y() * direction_y;
        let mut ray_length = velocity.y.abs() + skin;

        for i in 0..self.geometry.vertical_rays {
            // Offset by the clamped horizontal move so rays start where the body will be.
            let origin = origins.left_toward(direction_y)
                + Vec2::x() * (self.geometry.spacing.vertical * i as f32 + velocity.x);
            let Some(hit) = world.cast(origin, direction, ray_length, self.filter()) else {
                continue;
            };

            if hit.tags.has(self.config.one_way_tag) {
                if direction_y > 0.0 || hit.distance == 0.0 {
                    continue;
                }
                if self.state.falling_through_platform {
                    continue;
                }
                if intent.y < DROP_INTENT_THRESHOLD {
                    let until = tick.now + self.config.fall_through_cooldown;
                    self.state.begin_fall_through(until);
                    log::debug!(
                        "body {} drops through platform {} until t={until:.3}",
                        self.id,
                        hit.body
                    );
                    continue;
                }
            }

            velocity.y = (hit.distance - skin) * direction_y;
            ray_length = hit.distance;

            if self.state.ascending_slope {
                velocity.x = velocity.y / slope::tan_deg(self.state.slope_angle)
                    * slope::sign(velocity.x);
            }

            self.state.below = direction_y < 0.0;
            self.state.above = direction_y > 0.0;
        }

        if self.state.ascending_slope {
            self.retest_slope(world, origins, velocity);
        }
    }

    /// Catch a change of incline between the horizontal and vertical passes.
    fn retest_slope<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &W,
        origins: &RayOrigins,
        velocity: &mut Vec2,
    ) {
        let skin = self.geometry.skin_width;
        let direction_x = slope::sign(velocity.x);
        let origin = origins.bottom_toward(direction_x) + Vec2::y() * velocity.y;
        let ray_length = velocity.x.abs() + skin;

        let Some(hit) = world.cast(origin, Vec2::x() * direction_x, ray_length, self.filter())
        else {
            return;
        };
        if hit.distance == 0.0 {
            return;
        }

        let angle = slope::surface_angle(hit.normal);
        if !slope::angles_equal(angle, self.state.slope_angle) {
            velocity.x = (hit.distance - skin) * direction_x;
            log::trace!(
                "body {} slope changes from {:.1} to {angle:.1} degrees mid-step",
                self.id,
                self.state.slope_angle
            );
            self.state.slope_angle = angle;
        }
    }
}

impl ResolveStep for BodyController {
    #[inline]
    fn id(&self) -> BodyId {
        self.id
    }

    fn resolve_step<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        tick: Tick,
        request: MoveRequest,
    ) -> Result<MoveOutcome, MotionError> {
        self.move_body(world, tick, request)
    }
}
