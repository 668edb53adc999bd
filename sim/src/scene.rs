//! JSON scene description: level colliders, scripted bodies and moving platforms.

use std::{collections::HashSet, fs, path::Path};

use anyhow::Context;
use raycast2d::{
    BodyConfig, BodyController, BodyId, ColliderDef, CollisionWorld, Layer, PlatformConfig,
    PlatformController, Point2, SimClock, Vec2,
};
use serde::{Deserialize, Serialize};

use crate::{
    motor::{InputFrame, Motor, MotorConfig},
    simulation::{Actor, Simulation},
};

fn default_frames() -> u64 {
    600
}

fn default_dt() -> f32 {
    1.0 / 60.0
}

/// Input held over the frames `from..to`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputSpan {
    pub from: u64,
    pub to: u64,
    #[serde(default)]
    pub axis: Vec2,
    #[serde(default)]
    pub jump: bool,
}

impl InputSpan {
    #[inline]
    pub fn contains(&self, frame: u64) -> bool {
        (self.from..self.to).contains(&frame)
    }

    #[inline]
    pub fn input(&self) -> InputFrame {
        InputFrame {
            axis: self.axis,
            jump: self.jump,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    pub id: BodyId,
    pub center: Point2,
    pub half_extents: Vec2,
    #[serde(default)]
    pub config: BodyConfig,
    #[serde(default)]
    pub motor: MotorConfig,
    #[serde(default)]
    pub script: Vec<InputSpan>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpec {
    pub id: BodyId,
    pub center: Point2,
    pub half_extents: Vec2,
    pub config: PlatformConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default = "default_frames")]
    pub frames: u64,
    #[serde(default = "default_dt")]
    pub dt: f32,
    /// Static level geometry.
    #[serde(default)]
    pub colliders: Vec<ColliderDef>,
    #[serde(default)]
    pub bodies: Vec<BodySpec>,
    #[serde(default)]
    pub platforms: Vec<PlatformSpec>,
}

impl Scene {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading scene {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing scene {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the collision world and every controller the scene describes.
    pub fn build(&self) -> anyhow::Result<Simulation> {
        anyhow::ensure!(
            self.dt.is_finite() && self.dt > 0.0,
            "scene dt must be positive"
        );

        let mut ids = HashSet::new();
        for id in self
            .bodies
            .iter()
            .map(|b| b.id)
            .chain(self.platforms.iter().map(|p| p.id))
        {
            anyhow::ensure!(ids.insert(id), "body {id} is declared twice");
            anyhow::ensure!(
                self.colliders.iter().all(|c| c.body != id),
                "body {id} is also used by level geometry"
            );
        }

        let mut defs = self.colliders.clone();
        defs.extend(self.bodies.iter().map(|b| {
            ColliderDef::cuboid(b.id, b.center, b.half_extents).on_layer(Layer::PASSENGER)
        }));
        defs.extend(
            self.platforms
                .iter()
                .map(|p| ColliderDef::cuboid(p.id, p.center, p.half_extents)),
        );
        let world = CollisionWorld::build(defs).context("building collision world")?;

        let mut bodies = Vec::with_capacity(self.bodies.len());
        let mut actors = Vec::with_capacity(self.bodies.len());
        for spec in &self.bodies {
            let body = BodyController::new(spec.id, spec.config, &world)
                .with_context(|| format!("configuring body {}", spec.id))?;
            let motor =
                Motor::new(spec.motor).with_context(|| format!("configuring body {}", spec.id))?;
            log::debug!(
                "body {} gravity {:.2} jump velocity {:.2}",
                spec.id,
                motor.gravity(),
                motor.jump_velocity()
            );
            bodies.push(body);
            actors.push(Actor::new(motor, spec.script.clone()));
        }

        let platforms = self
            .platforms
            .iter()
            .map(|spec| {
                PlatformController::new(spec.id, spec.config.clone(), &world)
                    .with_context(|| format!("configuring platform {}", spec.id))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Simulation::new(
            world,
            SimClock::new(),
            self.dt,
            bodies,
            actors,
            platforms,
        ))
    }
}
