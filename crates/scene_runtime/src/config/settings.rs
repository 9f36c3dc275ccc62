//! Scene and engine settings

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::foundation::math::Vec2;

/// Settings for the 2D physics world owned by a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Physics2DSettings {
    /// World gravity in units per second squared
    pub gravity: Vec2,
    /// Velocity solver iterations forwarded to the physics backend
    pub velocity_iterations: u32,
    /// Position solver iterations forwarded to the physics backend
    pub position_iterations: u32,
}

impl Default for Physics2DSettings {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.8),
            velocity_iterations: 8,
            position_iterations: 3,
        }
    }
}

/// Per-scene settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Physics world configuration
    pub physics_2d: Physics2DSettings,
}

impl Config for SceneSettings {}

/// # Engine Configuration
///
/// Runtime behaviour for a host driving scenes: logging, the fixed step used
/// for updates and the default scene settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `env_logger` filter string
    pub log_level: String,
    /// Fixed update rate in Hz
    pub fixed_update_hz: f32,
    /// Frames to simulate before a headless host exits (0 = unlimited)
    pub max_frames: u64,
    /// Viewport size handed to scene cameras
    pub viewport: (u32, u32),
    /// Settings applied to newly created scenes
    pub scene: SceneSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            fixed_update_hz: 60.0,
            max_frames: 600,
            viewport: (1280, 720),
            scene: SceneSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the fixed update rate
    pub fn with_fixed_update_hz(mut self, hz: f32) -> Self {
        self.fixed_update_hz = hz;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_update_hz.is_finite() && self.fixed_update_hz > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "fixed_update_hz must be positive, got {}",
                self.fixed_update_hz
            )));
        }

        let gravity = self.scene.physics_2d.gravity;
        if !(gravity.x.is_finite() && gravity.y.is_finite()) {
            return Err(ConfigError::Invalid("gravity must be finite".to_string()));
        }

        if self.viewport.0 == 0 || self.viewport.1 == 0 {
            return Err(ConfigError::Invalid("viewport must be non-zero".to_string()));
        }

        Ok(())
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_gravity_points_down() {
        let settings = SceneSettings::default();
        assert_eq!(settings.physics_2d.gravity, Vec2::new(0.0, -9.8));
    }

    #[test]
    fn test_validate_rejects_bad_rate() {
        let config = EngineConfig::default().with_fixed_update_hz(0.0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: EngineConfig = toml::from_str("log_level = \"debug\"").unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.scene, SceneSettings::default());
    }
}
