//! Input-to-velocity glue: turns a scripted input frame into a resolver request.

use raycast2d::{CollisionState, MoveRequest, Vec2};
use serde::{Deserialize, Serialize};

/// Movement tuning of one scripted body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorConfig {
    /// Units per second at full horizontal input.
    pub move_speed: f32,
    /// Apex height of a jump, in units.
    pub jump_height: f32,
    /// Seconds from take-off to apex.
    pub time_to_jump_apex: f32,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_height: 3.0,
            time_to_jump_apex: 0.25,
        }
    }
}

/// Input for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputFrame {
    /// Directional axis in `[-1, 1]` per component.
    pub axis: Vec2,
    pub jump: bool,
}

/// Velocity integrator for one body.
#[derive(Clone, Copy, Debug)]
pub struct Motor {
    config: MotorConfig,
    gravity: f32,
    jump_velocity: f32,
    velocity: Vec2,
}

impl Motor {
    pub fn new(config: MotorConfig) -> anyhow::Result<Self> {
        anyhow::ensure!(
            config.jump_height > 0.0 && config.time_to_jump_apex > 0.0,
            "jump height and time to apex must be positive"
        );
        anyhow::ensure!(config.move_speed.is_finite(), "move speed must be finite");

        let gravity = -(2.0 * config.jump_height) / config.time_to_jump_apex.powi(2);
        Ok(Self {
            config,
            gravity,
            jump_velocity: gravity.abs() * config.time_to_jump_apex,
            velocity: Vec2::zeros(),
        })
    }

    #[inline]
    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    #[inline]
    pub fn jump_velocity(&self) -> f32 {
        self.jump_velocity
    }

    /// Integrate one frame and build the displacement request for it.
    ///
    /// `state` is the body's collision state from its previous resolution.
    pub fn request(&mut self, input: InputFrame, state: &CollisionState, dt: f32) -> MoveRequest {
        if state.above || state.below {
            self.velocity.y = 0.0;
        }
        if input.jump && state.below {
            self.velocity.y = self.jump_velocity;
        }

        self.velocity.x = input.axis.x * self.config.move_speed;
        self.velocity.y += self.gravity * dt;

        MoveRequest::new(self.velocity * dt).with_intent(input.axis)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn derives_gravity_from_jump_shape() {
        let motor = Motor::new(MotorConfig::default()).unwrap();

        assert_relative_eq!(motor.gravity(), -96.0);
        assert_relative_eq!(motor.jump_velocity(), 24.0);
    }

    #[test]
    fn jumps_only_from_the_ground() {
        let mut motor = Motor::new(MotorConfig::default()).unwrap();
        let dt = 0.01;
        let jump = InputFrame {
            axis: Vec2::new(1.0, 0.0),
            jump: true,
        };

        let airborne = motor.request(jump, &CollisionState::default(), dt);
        assert!(airborne.velocity.y < 0.0);
        assert_relative_eq!(airborne.velocity.x, 0.05);

        let grounded = CollisionState {
            below: true,
            ..CollisionState::default()
        };
        let takeoff = motor.request(jump, &grounded, dt);
        assert_relative_eq!(takeoff.velocity.y, (24.0 - 0.96) * dt, epsilon = 1.0e-5);
    }

    #[test]
    fn forwards_vertical_axis_as_drop_intent() {
        let mut motor = Motor::new(MotorConfig::default()).unwrap();
        let input = InputFrame {
            axis: Vec2::new(0.0, -1.0),
            jump: false,
        };

        let request = motor.request(input, &CollisionState::default(), 0.016);

        assert_eq!(request.intent, Vec2::new(0.0, -1.0));
        assert!(!request.standing_on_platform);
    }

    #[test]
    fn rejects_degenerate_jump() {
        let config = MotorConfig {
            time_to_jump_apex: 0.0,
            ..MotorConfig::default()
        };
        assert!(Motor::new(config).is_err());
    }
}
