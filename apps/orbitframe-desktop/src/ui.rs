use std::f32::consts::TAU;

use glam::Vec3;
use orbitframe_camera::OrbitCamera;
use orbitframe_frame::PumpStats;
use orbitframe_render::SceneState;

/// Pump figures shown in the panel.
pub struct FrameInfo {
    pub fence_value: u64,
    pub frames_in_flight: usize,
    pub stats: PumpStats,
    pub skipped_frames: u64,
}

/// Debug panel: camera sliders, scene and light controls, pump statistics.
pub fn draw_panel(
    ctx: &egui::Context,
    camera: &mut OrbitCamera,
    scene: &mut SceneState,
    info: &FrameInfo,
) {
    egui::Window::new("Camera")
        .default_width(300.0)
        .show(ctx, |ui| {
            let mut rotate = camera.rotate();
            vec3_sliders(ui, "rotate", &mut rotate, -TAU..=TAU);
            if rotate != camera.rotate() {
                camera.set_rotate(rotate);
            }

            let mut translate = camera.translate();
            vec3_sliders(ui, "translate", &mut translate, -100.0..=100.0);
            if translate != camera.translate() {
                camera.set_translate(translate);
            }

            if ui.button("Reset camera (R)").clicked() {
                camera.initialize();
            }

            ui.separator();
            egui::CollapsingHeader::new("Scene")
                .default_open(false)
                .show(ui, |ui| {
                    vec3_sliders(ui, "sphere", &mut scene.sphere.translate, -10.0..=10.0);
                    ui.add(egui::Slider::new(&mut scene.spin, -0.1..=0.1).text("spin"));
                    ui.checkbox(&mut scene.sphere_material.lit, "light sphere");
                    ui.checkbox(&mut scene.show_sprite, "show sprite");
                    vec3_sliders(ui, "sprite", &mut scene.sprite.translate, -640.0..=640.0);
                });

            egui::CollapsingHeader::new("Light")
                .default_open(false)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label("color");
                        ui.color_edit_button_rgba_unmultiplied(&mut scene.lighting.color);
                    });
                    vec3_sliders(ui, "direction", &mut scene.lighting.direction, -1.0..=1.0);
                    ui.add(
                        egui::Slider::new(&mut scene.lighting.intensity, 0.0..=4.0)
                            .text("intensity"),
                    );
                });

            ui.separator();
            ui.label(format!(
                "fence {}  ring {}",
                info.fence_value, info.frames_in_flight
            ));
            ui.label(format!(
                "stalls {}  fast {}  skipped {}",
                info.stats.stalls, info.stats.fast_paths, info.skipped_frames
            ));
            ui.label(format!("last wait {:?}", info.stats.last_wait));
            ui.small("RMB: rotate | MMB: pan | WASD: move | Shift: lock height | F1: panel");
        });
}

fn vec3_sliders(
    ui: &mut egui::Ui,
    label: &str,
    value: &mut Vec3,
    range: std::ops::RangeInclusive<f32>,
) {
    ui.label(label);
    ui.add(egui::Slider::new(&mut value.x, range.clone()).text("x"));
    ui.add(egui::Slider::new(&mut value.y, range.clone()).text("y"));
    ui.add(egui::Slider::new(&mut value.z, range).text("z"));
}
