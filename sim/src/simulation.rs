//! Fixed-step driver: platforms first, then every scripted body.

use raycast2d::{
    BodyController, BodyTransforms, Bounds, CollisionWorld, MotionError, PlatformController,
    ResolveStep, RiderClaims, SimClock,
};

use crate::{
    motor::{InputFrame, Motor},
    scene::InputSpan,
};

/// Motor and input script driving one body.
#[derive(Clone, Debug)]
pub struct Actor {
    motor: Motor,
    script: Vec<InputSpan>,
}

impl Actor {
    pub fn new(motor: Motor, script: Vec<InputSpan>) -> Self {
        Self { motor, script }
    }

    /// Input held at `frame`. The first matching span wins.
    pub fn input_at(&self, frame: u64) -> InputFrame {
        self.script
            .iter()
            .find(|span| span.contains(frame))
            .map(InputSpan::input)
            .unwrap_or_default()
    }
}

#[derive(Debug)]
pub struct Simulation {
    world: CollisionWorld,
    clock: SimClock,
    dt: f32,
    bodies: Vec<BodyController>,
    actors: Vec<Actor>,
    platforms: Vec<PlatformController>,
}

impl Simulation {
    pub fn new(
        world: CollisionWorld,
        clock: SimClock,
        dt: f32,
        bodies: Vec<BodyController>,
        actors: Vec<Actor>,
        platforms: Vec<PlatformController>,
    ) -> Self {
        debug_assert_eq!(bodies.len(), actors.len());
        Self {
            world,
            clock,
            dt,
            bodies,
            actors,
            platforms,
        }
    }

    #[inline]
    pub fn world(&self) -> &CollisionWorld {
        &self.world
    }

    #[inline]
    pub fn bodies(&self) -> &[BodyController] {
        &self.bodies
    }

    #[inline]
    pub fn platforms(&self) -> &[PlatformController] {
        &self.platforms
    }

    /// Number of frames stepped so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.clock.current().frame
    }

    pub fn bounds_of(&self, body: &BodyController) -> Option<Bounds> {
        self.world.bounds(body.id())
    }

    /// Step one frame.
    ///
    /// Platforms move (and carry their riders) before bodies apply their own input, so a rider
    /// resolves its own motion against the platform's new position. A rider touching several
    /// platforms is carried by the first one only.
    pub fn step(&mut self) -> Result<(), MotionError> {
        // Scripts are indexed from 0 while clock frames start at 1.
        let script_frame = self.frame();
        let tick = self.clock.advance(self.dt);

        let mut claimed = RiderClaims::default();
        for platform in &mut self.platforms {
            platform.step_with_claims(&mut self.world, &mut self.bodies, tick, &mut claimed)?;
        }

        for (body, actor) in self.bodies.iter_mut().zip(&mut self.actors) {
            let was_grounded = body.state().below;
            let input = actor.input_at(script_frame);
            let request = actor.motor.request(input, body.state(), tick.dt);
            let outcome = body.resolve_step(&mut self.world, tick, request)?;

            if outcome.state.below != was_grounded {
                log::debug!(
                    "body {} {} at frame {}",
                    body.id(),
                    if outcome.state.below { "landed" } else { "left the ground" },
                    tick.frame
                );
            }
        }
        Ok(())
    }

    pub fn run(&mut self, frames: u64) -> Result<(), MotionError> {
        for _ in 0..frames {
            self.step()?;
        }
        Ok(())
    }
}
