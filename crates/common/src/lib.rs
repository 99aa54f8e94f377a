//! Shared types and math helpers.
//!
//! # Invariants
//! - Matrices are column-major `glam` matrices applied to column vectors.
//! - Rotations compose X, then Y, then Z (left-handed, +Z into the screen).

pub mod math;
pub mod types;

pub use math::{affine, approx_eq_mat4, transform_normal};
pub use types::Transform;

pub fn crate_info() -> &'static str {
    "orbitframe-common v0.1.0"
}
