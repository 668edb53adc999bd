use rapier2d::parry::utils::hashmap::HashMap;

use super::{
    passengers::{PassengerMovement, PassengerRegistry, RiderClaims, detect_passengers},
    waypoints::{TraversalPhase, WaypointPath},
};
use crate::{
    clock::Tick,
    collision::{
        BodyId, BodyTransforms, MoveRequest, PhysicsWorld, RayGeometry, ResolveStep, Vec2,
    },
    config::PlatformConfig,
    error::{ConfigError, MotionError},
};

/// What one platform step did.
#[derive(Clone, Debug, PartialEq)]
pub struct PlatformStep {
    /// Translation applied to the platform.
    pub displacement: Vec2,
    /// Phase the step started in.
    pub phase: TraversalPhase,
    /// Riders detected this frame, in claim order.
    pub passengers: Vec<PassengerMovement>,
}

#[derive(Clone, Copy, Debug)]
struct CachedRider {
    slot: usize,
    last_seen: u64,
}

/// Moves one platform along its waypoints and carries whatever rides it.
#[derive(Clone, Debug)]
pub struct PlatformController {
    id: BodyId,
    config: PlatformConfig,
    geometry: RayGeometry,
    path: WaypointPath,
    rider_cache: HashMap<BodyId, CachedRider>,
}

impl PlatformController {
    /// Validate `config`, anchor the waypoints at the platform's current center and lay out its
    /// detection rays.
    pub fn new<W: BodyTransforms + ?Sized>(
        id: BodyId,
        config: PlatformConfig,
        world: &W,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let bounds = world.bounds(id).ok_or(ConfigError::MissingBody(id))?;
        let geometry = RayGeometry::new(&bounds, config.rays, config.skin_width)?;
        let path = WaypointPath::new(bounds.center(), &config)?;

        Ok(Self {
            id,
            config,
            geometry,
            path,
            rider_cache: HashMap::default(),
        })
    }

    #[inline]
    pub fn id(&self) -> BodyId {
        self.id
    }

    #[inline]
    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    #[inline]
    pub fn path(&self) -> &WaypointPath {
        &self.path
    }

    /// Number of rider lookups currently cached.
    #[inline]
    pub fn cached_riders(&self) -> usize {
        self.rider_cache.len()
    }

    /// Advance the platform one frame.
    ///
    /// Riders the platform pushes or lifts move first, then the platform translates, then riders
    /// carried on top move. Every rider goes through its own resolver.
    pub fn step<W, R>(
        &mut self,
        world: &mut W,
        riders: &mut R,
        tick: Tick,
    ) -> Result<PlatformStep, MotionError>
    where
        W: PhysicsWorld + ?Sized,
        R: PassengerRegistry + ?Sized,
    {
        self.step_with_claims(world, riders, tick, &mut RiderClaims::default())
    }

    /// Same as [`step`](Self::step), skipping riders already in `claimed` and adding the ones
    /// this platform takes. Pass one set to every platform stepped in a frame.
    pub fn step_with_claims<W, R>(
        &mut self,
        world: &mut W,
        riders: &mut R,
        tick: Tick,
        claimed: &mut RiderClaims,
    ) -> Result<PlatformStep, MotionError>
    where
        W: PhysicsWorld + ?Sized,
        R: PassengerRegistry + ?Sized,
    {
        let bounds = world
            .bounds(self.id)
            .ok_or(MotionError::UnknownBody(self.id))?;
        let origins = self.geometry.origins(&bounds);

        let phase = self.path.phase(tick.now);
        let displacement = self.path.advance(bounds.center(), tick);
        let passengers = detect_passengers(
            &*world,
            self.id,
            &self.geometry,
            &origins,
            self.config.passenger_mask,
            displacement,
            claimed,
        );

        self.move_passengers(world, riders, &passengers, tick, true)?;
        world.translate(self.id, displacement)?;
        self.move_passengers(world, riders, &passengers, tick, false)?;

        self.evict_stale_riders(tick.frame);

        Ok(PlatformStep {
            displacement,
            phase,
            passengers,
        })
    }

    fn move_passengers<W, R>(
        &mut self,
        world: &mut W,
        riders: &mut R,
        passengers: &[PassengerMovement],
        tick: Tick,
        before_platform: bool,
    ) -> Result<(), MotionError>
    where
        W: PhysicsWorld + ?Sized,
        R: PassengerRegistry + ?Sized,
    {
        for passenger in passengers
            .iter()
            .filter(|p| p.move_before_platform == before_platform)
        {
            let found = lookup_rider(&mut self.rider_cache, riders, passenger.rider, tick.frame);
            let Some(rider) = found else {
                log::warn!(
                    "platform {} carries body {} which has no registered resolver",
                    self.id,
                    passenger.rider
                );
                continue;
            };
            let request =
                MoveRequest::new(passenger.velocity).on_platform(passenger.standing_on_platform);
            rider.resolve_step(world, tick, request)?;
        }
        Ok(())
    }

    fn evict_stale_riders(&mut self, frame: u64) {
        let limit = self.config.rider_eviction_frames;
        let before = self.rider_cache.len();
        self.rider_cache
            .retain(|_, cached| frame.saturating_sub(cached.last_seen) <= limit);
        let evicted = before - self.rider_cache.len();
        if evicted > 0 {
            log::debug!("platform {} evicted {evicted} stale riders", self.id);
        }
    }
}

/// Resolve a rider through the cache, falling back to a registry search on a miss or a stale
/// slot. Refreshes the sighting frame of every rider found.
fn lookup_rider<'r, R: PassengerRegistry + ?Sized>(
    cache: &mut HashMap<BodyId, CachedRider>,
    riders: &'r mut R,
    id: BodyId,
    frame: u64,
) -> Option<&'r mut R::Rider> {
    let cached_slot = cache
        .get(&id)
        .map(|cached| cached.slot)
        .filter(|&slot| riders.rider_mut(slot, id).is_some());

    let slot = match cached_slot.or_else(|| riders.locate(id)) {
        Some(slot) => slot,
        None => {
            cache.remove(&id);
            return None;
        }
    };

    cache.insert(
        id,
        CachedRider {
            slot,
            last_seen: frame,
        },
    );
    riders.rider_mut(slot, id)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{
        collision::{BodyController, ColliderDef, CollisionWorld, Point2},
        config::BodyConfig,
        test_support::{PLATFORM, PLAYER, body_box, floor},
    };

    fn platform_config(waypoints: Vec<Vec2>) -> PlatformConfig {
        PlatformConfig {
            waypoints,
            speed: 2.0,
            ease_amount: 0.0,
            wait_time: 0.0,
            ..PlatformConfig::default()
        }
    }

    /// Platform centered at `center`, rider standing on it, optional level colliders.
    fn scene(center: Point2, mut level: Vec<ColliderDef>) -> CollisionWorld {
        let half_extents = Vec2::new(1.5, 0.25);
        let top = center.y + half_extents.y;
        level.push(ColliderDef::cuboid(PLATFORM, center, half_extents));
        level.push(body_box(
            PLAYER,
            Point2::new(center.x, top + 1.0),
            Vec2::new(0.5, 1.0),
        ));
        CollisionWorld::build(level).unwrap()
    }

    fn riders(world: &CollisionWorld) -> Vec<BodyController> {
        vec![BodyController::new(PLAYER, BodyConfig::default(), world).unwrap()]
    }

    struct Frame {
        step: PlatformStep,
        platform_delta: Vec2,
        rider_delta: Vec2,
    }

    fn run_frames(
        platform: &mut PlatformController,
        world: &mut CollisionWorld,
        riders: &mut Vec<BodyController>,
        frames: u64,
    ) -> Vec<Frame> {
        let dt: f32 = 1.0 / 30.0;
        (1..=frames)
            .map(|frame| {
                let tick = Tick::new(frame as f64 * f64::from(dt), dt, frame);
                let platform_before = world.bounds(PLATFORM).unwrap().min;
                let rider_before = world.bounds(PLAYER).unwrap().min;
                let step = platform.step(world, riders, tick).unwrap();
                Frame {
                    step,
                    platform_delta: world.bounds(PLATFORM).unwrap().min - platform_before,
                    rider_delta: world.bounds(PLAYER).unwrap().min - rider_before,
                }
            })
            .collect()
    }

    #[test]
    fn rider_follows_a_sinking_platform_exactly() {
        let mut world = scene(Point2::new(0.0, 5.0), Vec::new());
        let mut riders = riders(&world);
        let mut platform = PlatformController::new(
            PLATFORM,
            platform_config(vec![Vec2::zeros(), Vec2::new(0.0, -3.0)]),
            &world,
        )
        .unwrap();

        let frames = run_frames(&mut platform, &mut world, &mut riders, 20);

        let mut carried = 0;
        for frame in &frames {
            assert_relative_eq!(frame.step.displacement, frame.platform_delta, epsilon = 1.0e-5);
            if frame.platform_delta.y < 0.0 {
                assert_relative_eq!(frame.rider_delta, frame.platform_delta, epsilon = 1.0e-4);
                carried += 1;
            }
        }
        assert!(carried > 0);
        assert!(riders[0].state().below);
        assert!(riders[0].state().is_consistent());
    }

    #[test]
    fn rider_is_lifted_by_a_rising_platform() {
        let mut world = scene(Point2::new(0.0, 1.0), Vec::new());
        let mut riders = riders(&world);
        let mut platform = PlatformController::new(
            PLATFORM,
            platform_config(vec![Vec2::zeros(), Vec2::new(0.0, 2.0)]),
            &world,
        )
        .unwrap();

        let frames = run_frames(&mut platform, &mut world, &mut riders, 20);

        for frame in frames.iter().filter(|f| f.platform_delta.y > 0.0) {
            assert_eq!(frame.step.passengers.len(), 1);
            assert!(frame.step.passengers[0].move_before_platform);
            assert_relative_eq!(frame.rider_delta, frame.platform_delta, epsilon = 1.0e-4);
        }
        // Rider bottom still rests on the platform top.
        let platform_top = world.bounds(PLATFORM).unwrap().max.y;
        let rider_bottom = world.bounds(PLAYER).unwrap().min.y;
        assert_relative_eq!(rider_bottom, platform_top, epsilon = 1.0e-3);
        assert!(riders[0].state().below);
    }

    #[test]
    fn sliding_platform_carries_rider_sideways() {
        let mut world = scene(Point2::new(0.0, 1.0), Vec::new());
        let mut riders = riders(&world);
        let mut platform = PlatformController::new(
            PLATFORM,
            platform_config(vec![Vec2::zeros(), Vec2::new(3.0, 0.0)]),
            &world,
        )
        .unwrap();

        let frames = run_frames(&mut platform, &mut world, &mut riders, 10);

        for frame in frames.iter().filter(|f| f.platform_delta.x != 0.0) {
            assert!(!frame.step.passengers[0].move_before_platform);
            assert_relative_eq!(frame.rider_delta.x, frame.platform_delta.x, epsilon = 1.0e-4);
        }
    }

    #[test]
    fn paused_platform_detects_nobody() {
        let mut world = scene(Point2::new(0.0, 1.0), vec![floor(-5.0)]);
        let mut riders = riders(&world);
        let mut config = platform_config(vec![Vec2::zeros(), Vec2::new(1.0, 0.0)]);
        config.wait_time = 10.0;
        config.speed = 100.0;
        let mut platform = PlatformController::new(PLATFORM, config, &world).unwrap();

        let first = platform.step(&mut world, &mut riders, Tick::new(0.1, 0.1, 1)).unwrap();
        assert_eq!(first.phase, TraversalPhase::Traveling);

        let paused = platform.step(&mut world, &mut riders, Tick::new(0.2, 0.1, 2)).unwrap();
        assert_eq!(paused.phase, TraversalPhase::Paused);
        assert_eq!(paused.displacement, Vec2::zeros());
        assert!(paused.passengers.is_empty());
    }

    #[test]
    fn unregistered_rider_is_skipped() {
        let mut world = scene(Point2::new(0.0, 5.0), Vec::new());
        let mut platform = PlatformController::new(
            PLATFORM,
            platform_config(vec![Vec2::zeros(), Vec2::new(0.0, -3.0)]),
            &world,
        )
        .unwrap();
        let rider_before = world.bounds(PLAYER).unwrap();

        let mut nobody: Vec<BodyController> = Vec::new();
        let step = platform
            .step(&mut world, &mut nobody, Tick::new(0.1, 0.1, 1))
            .unwrap();

        assert_eq!(step.passengers.len(), 1);
        assert_eq!(world.bounds(PLAYER).unwrap(), rider_before);
        assert_eq!(platform.cached_riders(), 0);
    }

    #[test]
    fn stale_riders_are_evicted() {
        let mut world = scene(Point2::new(0.0, 1.0), Vec::new());
        let mut riders = riders(&world);
        let mut config = platform_config(vec![Vec2::zeros(), Vec2::new(0.0, -0.5)]);
        config.rider_eviction_frames = 3;
        let mut platform = PlatformController::new(PLATFORM, config, &world).unwrap();

        platform
            .step(&mut world, &mut riders, Tick::new(0.1, 0.1, 1))
            .unwrap();
        assert_eq!(platform.cached_riders(), 1);

        // Lift the rider far away so no fan sees it again.
        world.translate(PLAYER, Vec2::new(0.0, 50.0)).unwrap();
        for frame in 2..=4 {
            platform
                .step(&mut world, &mut riders, Tick::new(frame as f64 * 0.1, 0.1, frame))
                .unwrap();
        }
        assert_eq!(platform.cached_riders(), 1);

        platform
            .step(&mut world, &mut riders, Tick::new(0.5, 0.1, 5))
            .unwrap();
        assert_eq!(platform.cached_riders(), 0);
    }

    #[test]
    fn shared_claims_carry_a_straddling_rider_once() {
        // Two lifts side by side rising diagonally; the rider stands across the seam.
        let second = BodyId(11);
        let half_extents = Vec2::new(1.5, 0.25);
        let mut world = CollisionWorld::build(vec![
            ColliderDef::cuboid(PLATFORM, Point2::new(0.0, 5.0), half_extents),
            ColliderDef::cuboid(second, Point2::new(3.0, 5.0), half_extents),
            body_box(PLAYER, Point2::new(1.5, 6.25), Vec2::new(0.5, 1.0)),
        ])
        .unwrap();
        let mut riders = riders(&world);
        let route = vec![Vec2::zeros(), Vec2::new(2.0, 2.0)];
        let mut first =
            PlatformController::new(PLATFORM, platform_config(route.clone()), &world).unwrap();
        let mut later = PlatformController::new(second, platform_config(route), &world).unwrap();

        let tick = Tick::new(0.1, 0.1, 1);
        let before = world.bounds(PLAYER).unwrap().min;
        let mut claimed = RiderClaims::default();
        let carried = first
            .step_with_claims(&mut world, &mut riders, tick, &mut claimed)
            .unwrap();
        let skipped = later
            .step_with_claims(&mut world, &mut riders, tick, &mut claimed)
            .unwrap();

        assert_eq!(carried.passengers.len(), 1);
        assert!(skipped.passengers.is_empty());
        assert!(claimed.contains(&PLAYER));
        let moved = world.bounds(PLAYER).unwrap().min - before;
        assert_relative_eq!(moved, carried.displacement, epsilon = 1.0e-4);
    }

    #[test]
    fn reordered_registry_is_relocated() {
        let mut world = scene(Point2::new(0.0, 5.0), Vec::new());
        world
            .insert(body_box(BodyId(2), Point2::new(20.0, 20.0), Vec2::new(0.5, 0.5)))
            .unwrap();
        let mut riders = vec![
            BodyController::new(PLAYER, BodyConfig::default(), &world).unwrap(),
            BodyController::new(BodyId(2), BodyConfig::default(), &world).unwrap(),
        ];
        let mut platform = PlatformController::new(
            PLATFORM,
            platform_config(vec![Vec2::zeros(), Vec2::new(0.0, -3.0)]),
            &world,
        )
        .unwrap();

        platform
            .step(&mut world, &mut riders, Tick::new(0.1, 0.1, 1))
            .unwrap();
        riders.swap(0, 1);
        let before = world.bounds(PLAYER).unwrap();
        let step = platform
            .step(&mut world, &mut riders, Tick::new(0.2, 0.1, 2))
            .unwrap();

        let moved = world.bounds(PLAYER).unwrap().min - before.min;
        assert_relative_eq!(moved, step.displacement, epsilon = 1.0e-4);
    }
}
