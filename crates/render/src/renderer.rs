use std::fmt::Write;

use orbitframe_camera::OrbitCamera;

use crate::scene::{SceneState, SceneTransforms, Viewport};

/// Everything a renderer reads for one frame.
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    pub camera: &'a OrbitCamera,
    pub scene: &'a SceneState,
    pub viewport: Viewport,
}

impl SceneView<'_> {
    pub fn transforms(&self) -> SceneTransforms {
        SceneTransforms::compute(self.camera.world_matrix(), self.scene, self.viewport)
    }
}

/// Renderer-agnostic interface.
///
/// A renderer reads the camera and scene and produces output. It never
/// mutates either.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given view.
    fn render(&self, view: &SceneView<'_>) -> Self::Output;
}

/// Text dump of camera and scene state. Used by the CLI and in tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, view: &SceneView<'_>) -> String {
        let mut out = String::new();
        let cam = view.camera;
        let (r, t) = (cam.rotate(), cam.translate());
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "=== Frame ({}x{}) ===",
            view.viewport.width, view.viewport.height
        );
        let _ = writeln!(
            out,
            "Camera: rotate=({:.3}, {:.3}, {:.3}) translate=({:.3}, {:.3}, {:.3})",
            r.x, r.y, r.z, t.x, t.y, t.z
        );

        let world = cam.world_matrix().to_cols_array_2d();
        out.push_str("World:\n");
        for row in 0..4 {
            let _ = writeln!(
                out,
                "  [{:8.3} {:8.3} {:8.3} {:8.3}]",
                world[0][row], world[1][row], world[2][row], world[3][row]
            );
        }

        let s = view.scene.sphere.translate;
        let _ = writeln!(
            out,
            "Sphere: pos=({:.2}, {:.2}, {:.2}) yaw={:.3}",
            s.x, s.y, s.z, view.scene.sphere.rotate.y
        );
        let _ = writeln!(
            out,
            "Sprite: {}",
            if view.scene.show_sprite { "shown" } else { "hidden" }
        );
        out
    }
}
