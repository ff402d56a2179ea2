/// Demo configuration: presets for both demos and JSON overrides
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::projection::{deg_to_rad, PerspectiveConfig};
use crate::shading::Lighting;
use crate::transform::TransformSpec;

/// Which demo to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoKind {
    /// Shoulder, arm and hand swinging on a fixed clock
    Arm,
    /// Field of tumbling cuboids under a slowly rotating camera
    Cuboids,
}

impl DemoKind {
    pub fn name(&self) -> &'static str {
        match self {
            DemoKind::Arm => "arm",
            DemoKind::Cuboids => "cuboids",
        }
    }
}

impl fmt::Display for DemoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DemoKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "arm" => Ok(DemoKind::Arm),
            "cuboids" => Ok(DemoKind::Cuboids),
            other => Err(Error::config(format!("unknown demo '{other}'"))),
        }
    }
}

/// Which buffers a backend clears at the start of each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearPolicy {
    ColorAndDepth,
    /// Previous frames stay visible behind the new one
    DepthOnly,
}

/// External clock driving the frame loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FrameClock {
    Interval { millis: u32 },
    /// Display-synchronised; hosts without vsync fall back to ~60 Hz
    AnimationFrame,
}

impl FrameClock {
    pub fn frame_millis(&self) -> u32 {
        match self {
            FrameClock::Interval { millis } => *millis,
            FrameClock::AnimationFrame => 16,
        }
    }
}

/// Presentation uniforms and clear behaviour of one demo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub clear: ClearPolicy,
    pub lighting: Lighting,
    pub base_color: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CuboidFieldConfig {
    pub count: usize,
    /// Edge length of the cube the cuboids are scattered in
    pub spread: f32,
    pub seed: u64,
}

impl Default for CuboidFieldConfig {
    fn default() -> Self {
        Self {
            count: 42,
            spread: 48.0,
            seed: 0x5eed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    pub demo: DemoKind,
    pub projection: PerspectiveConfig,
    pub eye_offset: TransformSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_increment: Option<TransformSpec>,
    pub presentation: Presentation,
    pub clock: FrameClock,
    #[serde(default)]
    pub cuboids: CuboidFieldConfig,
}

const LIGHT_POSITION: [f32; 3] = [2.5, 2.5, 2.5];
const AMBIENT: [f32; 3] = [0.4, 0.4, 0.4];

impl DemoConfig {
    /// Built-in settings for a demo. The aspect ratio defaults to 1 until the
    /// host knows its viewport, see [`DemoConfig::with_aspect`].
    pub fn preset(demo: DemoKind) -> Self {
        let projection = PerspectiveConfig::new(deg_to_rad(30.0), 1.0, 1.0, 100.0);
        let eye_offset = TransformSpec::new().with_z(-15.0);

        match demo {
            DemoKind::Arm => Self {
                demo,
                projection,
                eye_offset,
                camera_increment: None,
                presentation: Presentation {
                    clear: ClearPolicy::ColorAndDepth,
                    lighting: Lighting::new([1.0, 1.0, 1.0], LIGHT_POSITION, AMBIENT),
                    base_color: [0.7, 0.8, 0.1],
                },
                clock: FrameClock::Interval { millis: 33 },
                cuboids: CuboidFieldConfig::default(),
            },
            DemoKind::Cuboids => Self {
                demo,
                projection,
                eye_offset,
                camera_increment: Some(TransformSpec::rotation(0.00541, 0.00181, 0.00317)),
                presentation: Presentation {
                    clear: ClearPolicy::DepthOnly,
                    lighting: Lighting::new(
                        [232.0 / 255.0, 224.0 / 255.0, 135.0 / 255.0],
                        LIGHT_POSITION,
                        AMBIENT,
                    ),
                    base_color: [95.0 / 255.0, 159.0 / 255.0, 171.0 / 255.0],
                },
                clock: FrameClock::AnimationFrame,
                cuboids: CuboidFieldConfig::default(),
            },
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| Error::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::config(format!("failed to serialize config: {e}")))
    }

    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.projection.aspect = aspect;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.projection.validate()?;
        if let FrameClock::Interval { millis: 0 } = self.clock {
            return Err(Error::config("frame interval must be positive"));
        }
        if self.demo == DemoKind::Cuboids {
            if self.cuboids.count == 0 {
                return Err(Error::config("cuboid count must be positive"));
            }
            if !(self.cuboids.spread.is_finite() && self.cuboids.spread >= 0.0) {
                return Err(Error::config(format!(
                    "cuboid spread must be a non-negative number, got {}",
                    self.cuboids.spread
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for demo in [DemoKind::Arm, DemoKind::Cuboids] {
            let config = DemoConfig::preset(demo);
            assert_eq!(config.demo, demo);
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_presets_differ_in_presentation() {
        let arm = DemoConfig::preset(DemoKind::Arm);
        let cuboids = DemoConfig::preset(DemoKind::Cuboids);
        assert_eq!(arm.presentation.clear, ClearPolicy::ColorAndDepth);
        assert_eq!(cuboids.presentation.clear, ClearPolicy::DepthOnly);
        assert_ne!(
            arm.presentation.lighting.light_color,
            cuboids.presentation.lighting.light_color
        );
        assert_eq!(arm.presentation.lighting.ambient, cuboids.presentation.lighting.ambient);
        assert!(arm.camera_increment.is_none());
        assert!(cuboids.camera_increment.is_some());
        assert_eq!(arm.clock.frame_millis(), 33);
    }

    #[test]
    fn test_demo_kind_parsing() {
        assert_eq!("arm".parse::<DemoKind>().unwrap(), DemoKind::Arm);
        assert_eq!("cuboids".parse::<DemoKind>().unwrap(), DemoKind::Cuboids);
        assert!(matches!("cube".parse::<DemoKind>(), Err(Error::Config(_))));
        assert_eq!(DemoKind::Cuboids.to_string(), "cuboids");
    }

    #[test]
    fn test_json_round_trip_keeps_sparse_specs() {
        let config = DemoConfig::preset(DemoKind::Cuboids).with_aspect(16.0 / 9.0);
        let json = config.to_json().unwrap();
        assert!(json.contains("\"depth_only\""));
        assert!(json.contains("\"animation_frame\""));
        assert_eq!(DemoConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_json_overrides() {
        let mut config = DemoConfig::preset(DemoKind::Arm);
        config.clock = FrameClock::Interval { millis: 50 };
        config.presentation.base_color = [1.0, 0.0, 0.0];
        let parsed = DemoConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed.clock, FrameClock::Interval { millis: 50 });
        assert_eq!(parsed.presentation.base_color, [1.0, 0.0, 0.0]);
        // Missing cuboid section falls back to defaults.
        let json = config.to_json().unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value.as_object_mut().unwrap().remove("cuboids");
        let parsed = DemoConfig::from_json(&value.to_string()).unwrap();
        assert_eq!(parsed.cuboids, CuboidFieldConfig::default());
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(DemoConfig::from_json("{"), Err(Error::Config(_))));

        let mut config = DemoConfig::preset(DemoKind::Cuboids);
        config.cuboids.count = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = DemoConfig::preset(DemoKind::Arm);
        config.clock = FrameClock::Interval { millis: 0 };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = DemoConfig::preset(DemoKind::Arm).with_aspect(0.0);
        assert!(matches!(config.validate(), Err(Error::InvalidProjectionConfig(_))));
    }
}
