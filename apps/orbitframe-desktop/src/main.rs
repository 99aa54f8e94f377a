mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::IVec2;
use orbitframe_camera::{CameraConfig, OrbitCamera};
use orbitframe_frame::{FrameError, PumpConfig};
use orbitframe_input::{Button, InputState};
use orbitframe_render::{SceneState, SceneView, Viewport};
use orbitframe_render_wgpu::{
    DemoRenderer, GpuContext, GpuInit, WgpuFramePump, WgpuQueue, WgpuRecorder,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "orbitframe-desktop", about = "Orbit camera demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Window width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Window title
    #[arg(long, default_value = "OrbitFrame")]
    title: String,

    /// Recording buffers in the frame ring
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=3))]
    frames_in_flight: u32,

    /// JSON file with camera sensitivities and start position
    #[arg(long)]
    camera_config: Option<PathBuf>,
}

/// Camera, scene and input: everything that outlives the GPU objects.
struct AppState {
    camera: OrbitCamera,
    scene: SceneState,
    input: InputState,
    show_panel: bool,
    skipped_frames: u64,
}

impl AppState {
    fn new(camera_config: CameraConfig) -> Self {
        Self {
            camera: OrbitCamera::new(camera_config),
            scene: SceneState::default(),
            input: InputState::new(),
            show_panel: true,
            skipped_frames: 0,
        }
    }

    /// Apply a key transition. Presses the UI consumed are dropped; releases
    /// always land so no button stays held.
    fn handle_key(&mut self, key: KeyCode, key_state: ElementState, consumed: bool) {
        let pressed = key_state.is_pressed();
        if pressed && consumed {
            return;
        }
        let button = match key {
            KeyCode::KeyW => Button::W,
            KeyCode::KeyA => Button::A,
            KeyCode::KeyS => Button::S,
            KeyCode::KeyD => Button::D,
            KeyCode::ShiftLeft => Button::LeftShift,
            KeyCode::F1 if pressed => {
                self.show_panel = !self.show_panel;
                return;
            }
            KeyCode::KeyR if pressed => {
                self.camera.initialize();
                tracing::info!("camera reset");
                return;
            }
            _ => return,
        };
        self.input.set_held(button, pressed);
    }

    /// Mouse counterpart of [`AppState::handle_key`].
    fn handle_mouse(&mut self, button: MouseButton, btn_state: ElementState, consumed: bool) {
        let pressed = btn_state.is_pressed();
        if pressed && consumed {
            return;
        }
        match button {
            MouseButton::Right => self.input.set_held(Button::RightMouse, pressed),
            MouseButton::Middle => self.input.set_held(Button::MiddleMouse, pressed),
            _ => {}
        }
    }

    /// The pointer tracks the cursor even over the panel, so the next drag
    /// starts from where the cursor really is.
    fn handle_cursor(&mut self, position: PhysicalPosition<f64>) {
        self.input
            .set_pointer(IVec2::new(position.x as i32, position.y as i32));
    }
}

/// GPU objects created once the window exists.
///
/// Fields drop top to bottom: UI renderer, scene renderer, pump (drains the
/// queue), then the device context and finally the window.
struct Gpu {
    egui_renderer: egui_wgpu::Renderer,
    egui_winit: egui_winit::State,
    renderer: DemoRenderer,
    pump: WgpuFramePump,
    context: GpuContext,
    window: Arc<Window>,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        cli: &Cli,
        egui_ctx: &EguiContext,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(cli.title.clone())
            .with_inner_size(PhysicalSize::new(cli.width, cli.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let size = window.inner_size();
        let context = GpuContext::new(window.clone(), size.width, size.height, &GpuInit::default())
            .context("failed to initialize GPU")?;
        let device = context.device().clone();
        let (width, height) = context.size();

        let renderer = DemoRenderer::new(&device, context.queue(), context.format(), width, height);

        let queue = WgpuQueue::new(device.clone(), context.queue().clone());
        let pump_config = PumpConfig {
            frames_in_flight: cli.frames_in_flight as usize,
        };
        let pump = WgpuFramePump::with_config(queue, &pump_config, |i| {
            Ok(WgpuRecorder::new(device.clone(), i))
        })
        .context("failed to create frame pump")?;

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, context.format(), None, 1, false);

        tracing::info!(
            frames_in_flight = pump.frames_in_flight(),
            width,
            height,
            "window ready"
        );

        Ok(Self {
            egui_renderer,
            egui_winit,
            renderer,
            pump,
            context,
            window,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.context.resize(size.width, size.height);
        let (width, height) = self.context.size();
        self.renderer.resize(self.context.device(), width, height);
    }

    /// One full frame: camera and scene update, debug UI, scene and UI
    /// recording, then the pump's end-of-frame sequence.
    fn frame(&mut self, state: &mut AppState, egui_ctx: &EguiContext) -> Result<u64, FrameError> {
        state.camera.update(&state.input);
        state.scene.advance();

        let surface_texture = self.context.acquire()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let (width, height) = self.context.size();

        let panel_info = ui::FrameInfo {
            fence_value: self.pump.fence_value(),
            frames_in_flight: self.pump.frames_in_flight(),
            stats: self.pump.stats().clone(),
            skipped_frames: state.skipped_frames,
        };
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            if state.show_panel {
                ui::draw_panel(ctx, &mut state.camera, &mut state.scene, &panel_info);
            }
        });
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let scene_view = SceneView {
            camera: &state.camera,
            scene: &state.scene,
            viewport: Viewport::new(width, height),
        };
        let device = self.context.device();
        let queue = self.context.queue();
        self.renderer
            .write_constants(queue, &scene_view.transforms(), &state.scene);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        let encoder = self.pump.recorder_mut()?.encoder()?;
        self.renderer
            .record(encoder, &view, state.scene.show_sprite);
        self.egui_renderer
            .update_buffers(device, queue, encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.pump.end_frame(surface_texture)
    }
}

struct App {
    cli: Cli,
    state: AppState,
    egui_ctx: EguiContext,
    gpu: Option<Gpu>,
}

impl App {
    fn new(cli: Cli, camera_config: CameraConfig) -> Self {
        Self {
            cli,
            state: AppState::new(camera_config),
            egui_ctx: EguiContext::default(),
            gpu: None,
        }
    }

    fn shutdown(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            let Gpu { pump, .. } = gpu;
            match pump.shutdown() {
                Ok(()) => tracing::info!("frame pump drained"),
                Err(e) => tracing::error!("drain failed: {e}"),
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.cli, &self.egui_ctx) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("{e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let consumed = gpu.egui_winit.on_window_event(&gpu.window, &event).consumed;

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
            }
            WindowEvent::Focused(false) => {
                self.state.input.release_all();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if key == KeyCode::Escape && key_state.is_pressed() && !consumed {
                    event_loop.exit();
                    return;
                }
                self.state.handle_key(key, key_state, consumed);
            }
            WindowEvent::MouseInput {
                button,
                state: btn_state,
                ..
            } => {
                self.state.handle_mouse(button, btn_state, consumed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.handle_cursor(position);
            }
            WindowEvent::RedrawRequested => {
                match gpu.frame(&mut self.state, &self.egui_ctx) {
                    Ok(_) => {}
                    Err(e) if e.is_fatal() => {
                        tracing::error!("fatal frame error: {e}");
                        event_loop.exit();
                        return;
                    }
                    Err(e) => {
                        self.state.skipped_frames += 1;
                        tracing::warn!("frame skipped: {e}");
                    }
                }
                gpu.window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("orbitframe-desktop starting");

    let camera_config = match &cli.camera_config {
        Some(path) => CameraConfig::load(path)
            .with_context(|| format!("failed to load camera config {}", path.display()))?,
        None => CameraConfig::default(),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(cli, camera_config);
    event_loop.run_app(&mut app)?;
    app.shutdown();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitframe_input::InputSource;

    fn state() -> AppState {
        AppState::new(CameraConfig::default())
    }

    #[test]
    fn consumed_release_still_lets_go() {
        let mut state = state();
        state.handle_mouse(MouseButton::Right, ElementState::Pressed, false);
        assert!(state.input.is_held(Button::RightMouse));

        state.handle_mouse(MouseButton::Right, ElementState::Released, true);
        assert!(!state.input.is_held(Button::RightMouse));

        state.handle_key(KeyCode::KeyW, ElementState::Pressed, false);
        state.handle_key(KeyCode::KeyW, ElementState::Released, true);
        assert!(!state.input.is_held(Button::W));
    }

    #[test]
    fn consumed_press_is_ignored() {
        let mut state = state();
        state.handle_mouse(MouseButton::Middle, ElementState::Pressed, true);
        state.handle_key(KeyCode::ShiftLeft, ElementState::Pressed, true);
        state.handle_key(KeyCode::F1, ElementState::Pressed, true);
        assert!(!state.input.is_held(Button::MiddleMouse));
        assert!(!state.input.is_held(Button::LeftShift));
        assert!(state.show_panel);
    }

    #[test]
    fn keys_map_to_buttons() {
        let mut state = state();
        for (key, button) in [
            (KeyCode::KeyW, Button::W),
            (KeyCode::KeyA, Button::A),
            (KeyCode::KeyS, Button::S),
            (KeyCode::KeyD, Button::D),
            (KeyCode::ShiftLeft, Button::LeftShift),
        ] {
            state.handle_key(key, ElementState::Pressed, false);
            assert!(state.input.is_held(button), "{key:?}");
            state.handle_key(key, ElementState::Released, false);
            assert!(!state.input.is_held(button), "{key:?}");
        }
        state.handle_key(KeyCode::F1, ElementState::Pressed, false);
        assert!(!state.show_panel);
    }

    #[test]
    fn cursor_tracks_position() {
        let mut state = state();
        state.handle_cursor(PhysicalPosition::new(120.7, 48.2));
        assert_eq!(state.input.pointer_position(), IVec2::new(120, 48));
    }
}
