/*!
Per-instance configuration for bodies and platforms.

Defaults come from [`crate::collision::settings`]. Every type deserializes with
`#[serde(default)]`, so game data only needs to name the fields it overrides. Call `validate()`
(constructors do) before using a configuration.
*/

use serde::{Deserialize, Serialize};

use crate::{
    bitmask_flags::{FlagBitmask, Layer, LayerMask, Tag},
    collision::{
        Vec2,
        settings::{
            DEFAULT_EASE_AMOUNT, DEFAULT_FALL_THROUGH_COOLDOWN, DEFAULT_MAX_ASCEND_ANGLE,
            DEFAULT_MAX_DESCEND_ANGLE, DEFAULT_PLATFORM_SPEED, DEFAULT_PLATFORM_WAIT_TIME,
            DEFAULT_RAY_SPACING, DEFAULT_RIDER_EVICTION_FRAMES, DEFAULT_SKIN_WIDTH,
            MAX_EASE_AMOUNT,
        },
    },
    error::ConfigError,
};

/// How many rays each edge fires.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RayDensity {
    /// Fixed counts. Values below the minimum are clamped, never rejected.
    Counts { horizontal: u32, vertical: u32 },
    /// Counts derived from the box size so neighbouring rays sit about `target` apart.
    Spacing { target: f32 },
}

impl Default for RayDensity {
    fn default() -> Self {
        Self::Spacing {
            target: DEFAULT_RAY_SPACING,
        }
    }
}

impl RayDensity {
    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::Counts { .. } => Ok(()),
            Self::Spacing { target } if target.is_finite() && target > 0.0 => Ok(()),
            Self::Spacing { target } => Err(ConfigError::InvalidRaySpacing(target)),
        }
    }
}

/// Configuration of one body driven by the motion resolver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub rays: RayDensity,
    /// Layers the body collides with.
    pub collision_mask: LayerMask,
    pub skin_width: f32,
    /// Degrees between surface normal and +Y.
    pub max_ascend_angle: f32,
    /// Degrees between surface normal and +Y.
    pub max_descend_angle: f32,
    /// Surfaces carrying this tag are one-way platforms.
    pub one_way_tag: Tag,
    /// Seconds during which one-way platforms are ignored after a drop request.
    pub fall_through_cooldown: f64,
    pub starts_facing_right: bool,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            rays: RayDensity::default(),
            collision_mask: LayerMask::from_flags(&[Layer::GROUND]),
            skin_width: DEFAULT_SKIN_WIDTH,
            max_ascend_angle: DEFAULT_MAX_ASCEND_ANGLE,
            max_descend_angle: DEFAULT_MAX_DESCEND_ANGLE,
            one_way_tag: Tag::THROUGH_PLATFORM,
            fall_through_cooldown: DEFAULT_FALL_THROUGH_COOLDOWN,
            starts_facing_right: true,
        }
    }
}

impl BodyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_skin(self.skin_width)?;
        self.rays.validate()?;
        validate_angle("max_ascend_angle", self.max_ascend_angle)?;
        validate_angle("max_descend_angle", self.max_descend_angle)?;
        if !self.one_way_tag.fits_storage() {
            return Err(ConfigError::FlagOutOfRange {
                name: "one_way_tag",
                index: self.one_way_tag.bit_index(),
            });
        }
        validate_duration("fall_through_cooldown", self.fall_through_cooldown)
    }
}

/// Configuration of one moving platform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub rays: RayDensity,
    /// Layers scanned for riders.
    pub passenger_mask: LayerMask,
    pub skin_width: f32,
    /// Waypoints relative to the platform's position at construction.
    pub waypoints: Vec<Vec2>,
    /// Units per second along each leg.
    pub speed: f32,
    /// 0 is linear; larger values ease in and out more strongly.
    pub ease_amount: f32,
    /// Seconds to rest at each waypoint.
    pub wait_time: f64,
    /// Loop back to the first waypoint instead of reversing the path.
    pub cyclic: bool,
    /// Frames a rider may go unseen before its cached lookup is dropped.
    pub rider_eviction_frames: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            rays: RayDensity::default(),
            passenger_mask: LayerMask::from_flags(&[Layer::PASSENGER]),
            skin_width: DEFAULT_SKIN_WIDTH,
            waypoints: Vec::new(),
            speed: DEFAULT_PLATFORM_SPEED,
            ease_amount: DEFAULT_EASE_AMOUNT,
            wait_time: DEFAULT_PLATFORM_WAIT_TIME,
            cyclic: false,
            rider_eviction_frames: DEFAULT_RIDER_EVICTION_FRAMES,
        }
    }
}

impl PlatformConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_skin(self.skin_width)?;
        self.rays.validate()?;

        if self.waypoints.len() < 2 {
            return Err(ConfigError::TooFewWaypoints(self.waypoints.len()));
        }
        if let Some(index) = self
            .waypoints
            .iter()
            .position(|w| !(w.x.is_finite() && w.y.is_finite()))
        {
            return Err(ConfigError::NonFiniteWaypoint { index });
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(ConfigError::InvalidSpeed(self.speed));
        }
        if !(0.0..=MAX_EASE_AMOUNT).contains(&self.ease_amount) {
            return Err(ConfigError::InvalidEaseAmount {
                value: self.ease_amount,
                max: MAX_EASE_AMOUNT,
            });
        }
        validate_duration("wait_time", self.wait_time)
    }
}

fn validate_skin(skin: f32) -> Result<(), ConfigError> {
    if skin.is_finite() && skin > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSkinWidth(skin))
    }
}

fn validate_angle(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 90.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSlopeAngle { name, value })
    }
}

fn validate_duration(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_for_bodies() {
        assert_eq!(BodyConfig::default().validate(), Ok(()));
    }

    #[test]
    fn platform_requires_two_waypoints() {
        let mut config = PlatformConfig::default();
        assert_eq!(config.validate(), Err(ConfigError::TooFewWaypoints(0)));

        config.waypoints = vec![Vec2::zeros(), Vec2::new(0.0, 3.0)];
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let body = BodyConfig {
            skin_width: 0.0,
            ..BodyConfig::default()
        };
        assert_eq!(body.validate(), Err(ConfigError::InvalidSkinWidth(0.0)));

        let body = BodyConfig {
            max_descend_angle: 95.0,
            ..BodyConfig::default()
        };
        assert!(matches!(
            body.validate(),
            Err(ConfigError::InvalidSlopeAngle {
                name: "max_descend_angle",
                ..
            })
        ));

        let platform = PlatformConfig {
            waypoints: vec![Vec2::zeros(), Vec2::new(1.0, 0.0)],
            ease_amount: 2.5,
            ..PlatformConfig::default()
        };
        assert!(matches!(
            platform.validate(),
            Err(ConfigError::InvalidEaseAmount { .. })
        ));
    }

    #[test]
    fn one_way_tag_must_fit_the_tag_set() {
        let body: BodyConfig = serde_json::from_str(r#"{ "one_way_tag": 40 }"#).unwrap();

        assert_eq!(
            body.validate(),
            Err(ConfigError::FlagOutOfRange {
                name: "one_way_tag",
                index: 40
            })
        );
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let body: BodyConfig = serde_json::from_str(
            r#"{ "rays": { "counts": { "horizontal": 4, "vertical": 3 } }, "max_ascend_angle": 60.0 }"#,
        )
        .unwrap();

        assert_eq!(
            body.rays,
            RayDensity::Counts {
                horizontal: 4,
                vertical: 3
            }
        );
        assert_eq!(body.max_ascend_angle, 60.0);
        assert_eq!(body.skin_width, DEFAULT_SKIN_WIDTH);
        assert!(body.collision_mask.has(Layer::GROUND));

        let platform: PlatformConfig =
            serde_json::from_str(r#"{ "waypoints": [[0.0, 0.0], [4.0, 0.0]], "cyclic": true }"#)
                .unwrap();
        assert_eq!(platform.waypoints[1], Vec2::new(4.0, 0.0));
        assert!(platform.cyclic);
        assert_eq!(platform.speed, DEFAULT_PLATFORM_SPEED);
        assert_eq!(platform.validate(), Ok(()));
    }
}
