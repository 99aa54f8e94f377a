use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning for `OrbitCamera`. Defaults reproduce the demo's fixed constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Radians of rotation per pointer pixel while right-dragging.
    pub rotate_sensitivity: f32,
    /// Body-local distance moved per tick for each held WASD key.
    pub move_step: f32,
    /// Distance panned per pointer pixel while middle-dragging.
    pub pan_sensitivity: f32,
    /// Position set by `initialize`.
    pub initial_translate: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            rotate_sensitivity: 0.01,
            move_step: 0.2,
            pan_sensitivity: 0.1,
            initial_translate: Vec3::new(0.0, 0.0, -10.0),
        }
    }
}

/// Errors from loading a camera config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },
}

impl CameraConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config: CameraConfig = serde_json::from_reader(std::fs::File::open(path)?)?;
        config.validate()?;
        tracing::info!(path = %path.display(), "loaded camera config");
        Ok(config)
    }

    /// Reject NaN and infinite tuning values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scalars = [
            ("rotate_sensitivity", self.rotate_sensitivity),
            ("move_step", self.move_step),
            ("pan_sensitivity", self.pan_sensitivity),
            ("initial_translate.x", self.initial_translate.x),
            ("initial_translate.y", self.initial_translate.y),
            ("initial_translate.z", self.initial_translate.z),
        ];
        for (field, value) in scalars {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }
        Ok(())
    }
}
