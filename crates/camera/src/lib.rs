//! Camera Model: turns per-frame input deltas into a world transform.
//!
//! # Invariants
//! - The world matrix always equals `affine(1, rotate, translate)` of the
//!   current fields.
//! - Scale is forced to identity whenever the world matrix is rebuilt.
//! - The view matrix is the true inverse of the world matrix.

mod camera;
mod config;

pub use camera::OrbitCamera;
pub use config::{CameraConfig, ConfigError};

pub fn crate_info() -> &'static str {
    "orbitframe-camera v0.1.0"
}
