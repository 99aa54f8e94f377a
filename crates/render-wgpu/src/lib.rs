//! wgpu render backend.
//!
//! Draws a lit, textured sphere and a screen-space sprite, and adapts wgpu's
//! command encoders and queue to the frame pump's recorder/queue traits.
//!
//! # Invariants
//! - Renderer never mutates camera or scene state.
//! - Every frame's encoder comes from the pump; nothing here submits on its own.
//! - Setup failures are `GpuError`s; per-frame failures are `FrameError`s.

mod context;
mod gpu;
mod shaders;
mod sync;
mod texture;

pub use context::{GpuContext, GpuError, GpuInit};
pub use gpu::DemoRenderer;
pub use sync::{WgpuRecorder, WgpuQueue};
pub use texture::checkerboard_rgba;

/// Pump over wgpu encoders and the wgpu queue.
pub type WgpuFramePump = orbitframe_frame::FramePump<WgpuRecorder, WgpuQueue>;
