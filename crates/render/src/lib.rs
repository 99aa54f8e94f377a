//! Rendering Adapter: renderer-agnostic scene description.
//!
//! # Invariants
//! - Renderers read camera and scene state, never mutate it.
//! - The view matrix is always the inverse of the camera's world matrix.
//!
//! Geometry is generated here once and uploaded by a backend; transforms are
//! recomputed every frame and copied into constant buffers by the backend.

mod mesh;
mod renderer;
mod scene;

pub use mesh::{Mesh, Vertex, sphere_mesh, sprite_mesh};
pub use renderer::{DebugTextRenderer, Renderer, SceneView};
pub use scene::{
    Lighting, Material, ObjectTransforms, SceneState, SceneTransforms, Viewport,
    SPHERE_FOV_Y, SPRITE_SIZE,
};

pub fn crate_info() -> &'static str {
    "orbitframe-render v0.1.0"
}
