use glam::{IVec2, Mat4, Vec3};
use orbitframe_common::{affine, transform_normal};
use orbitframe_input::{Button, InputSource};

use crate::config::CameraConfig;

/// Orbit-style camera: right-drag rotates, middle-drag pans, WASD moves in
/// body-local axes, left-shift locks height.
///
/// Camera motion runs once per rendered frame on the control thread.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    config: CameraConfig,
    scale: Vec3,
    rotate: Vec3,
    translate: Vec3,
    world_matrix: Mat4,
    pointer: IVec2,
    previous_pointer: IVec2,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl OrbitCamera {
    /// Create an initialized camera.
    pub fn new(config: CameraConfig) -> Self {
        let mut camera = Self {
            config,
            scale: Vec3::ONE,
            rotate: Vec3::ZERO,
            translate: Vec3::ZERO,
            world_matrix: Mat4::IDENTITY,
            pointer: IVec2::ZERO,
            previous_pointer: IVec2::ZERO,
        };
        camera.initialize();
        camera
    }

    /// Reset to unit scale, no rotation, the configured start position, and
    /// zeroed pointer tracking.
    pub fn initialize(&mut self) {
        self.scale = Vec3::ONE;
        self.rotate = Vec3::ZERO;
        self.translate = self.config.initial_translate;
        self.world_matrix = affine(self.scale, self.rotate, self.translate);
        self.pointer = IVec2::ZERO;
        self.previous_pointer = IVec2::ZERO;
    }

    /// Advance one frame of input.
    pub fn update(&mut self, input: &impl InputSource) {
        let held_translate = self.translate;
        self.previous_pointer = self.pointer;
        self.pointer = input.pointer_position();
        let delta = self.pointer.saturating_sub(self.previous_pointer);

        if input.is_held(Button::RightMouse) {
            self.rotate.x += delta.y as f32 * self.config.rotate_sensitivity;
            self.rotate.y += delta.x as f32 * self.config.rotate_sensitivity;
        }

        let step = self.config.move_step;
        let mut velocity = Vec3::ZERO;
        if input.is_held(Button::A) {
            velocity.x -= step;
        }
        if input.is_held(Button::D) {
            velocity.x += step;
        }
        if input.is_held(Button::W) {
            velocity.z += step;
        }
        if input.is_held(Button::S) {
            velocity.z -= step;
        }

        if input.is_held(Button::MiddleMouse) {
            let pan = self.config.pan_sensitivity;
            velocity.x += -(delta.x as f32) * pan;
            velocity.y += delta.y as f32 * pan;
        }

        // Direction follows last frame's orientation.
        self.translate += transform_normal(velocity, &self.world_matrix);

        if input.is_held(Button::LeftShift) {
            self.translate.y = held_translate.y;
        }

        self.rebuild();
    }

    /// Overwrite the rotation (debug panel) and rebuild the world matrix.
    pub fn set_rotate(&mut self, rotate: Vec3) {
        self.rotate = rotate;
        self.rebuild();
    }

    /// Overwrite the position (debug panel) and rebuild the world matrix.
    pub fn set_translate(&mut self, translate: Vec3) {
        self.translate = translate;
        self.rebuild();
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn rotate(&self) -> Vec3 {
        self.rotate
    }

    pub fn translate(&self) -> Vec3 {
        self.translate
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    /// Inverse of the world matrix. Rotation and translation are composed, so
    /// this is a full inverse rather than a negated translation.
    pub fn view_matrix(&self) -> Mat4 {
        self.world_matrix.inverse()
    }

    pub fn pointer_position(&self) -> IVec2 {
        self.pointer
    }

    fn rebuild(&mut self) {
        // The stored scale is never fed back in.
        self.world_matrix = affine(Vec3::ONE, self.rotate, self.translate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitframe_common::approx_eq_mat4;
    use orbitframe_input::InputState;

    const EPS: f32 = 1e-5;

    fn held(buttons: &[Button], pointer: IVec2) -> InputState {
        let mut input = InputState::new();
        input.set_pointer(pointer);
        for b in buttons {
            input.press(*b);
        }
        input
    }

    #[test]
    fn initialize_places_camera_behind_origin() {
        let cam = OrbitCamera::default();
        assert_eq!(cam.scale(), Vec3::ONE);
        assert_eq!(cam.rotate(), Vec3::ZERO);
        assert_eq!(cam.translate(), Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(cam.pointer_position(), IVec2::ZERO);
        assert_eq!(
            cam.world_matrix(),
            Mat4::from_translation(Vec3::new(0.0, 0.0, -10.0))
        );
    }

    #[test]
    fn no_input_is_idempotent() {
        let mut cam = OrbitCamera::default();
        let input = InputState::new();
        let before = cam.world_matrix();
        for _ in 0..10 {
            cam.update(&input);
            assert_eq!(cam.translate(), Vec3::new(0.0, 0.0, -10.0));
            assert_eq!(cam.rotate(), Vec3::ZERO);
            assert_eq!(cam.world_matrix(), before);
        }
    }

    #[test]
    fn pointer_motion_without_buttons_changes_nothing() {
        let mut cam = OrbitCamera::default();
        cam.update(&held(&[], IVec2::new(100, 50)));
        cam.update(&held(&[], IVec2::new(300, -20)));
        assert_eq!(cam.rotate(), Vec3::ZERO);
        assert_eq!(cam.translate(), Vec3::new(0.0, 0.0, -10.0));
    }

    #[test]
    fn right_drag_orbits() {
        let mut cam = OrbitCamera::default();
        cam.update(&held(&[], IVec2::new(200, 100)));
        let before = cam.rotate();

        cam.update(&held(&[Button::RightMouse], IVec2::new(230, 80)));
        let d = IVec2::new(30, -20);
        let expected = before + Vec3::new(0.01 * d.y as f32, 0.01 * d.x as f32, 0.0);
        assert!((cam.rotate() - expected).length() < EPS);
        // Orbiting alone never moves the camera.
        assert_eq!(cam.translate(), Vec3::new(0.0, 0.0, -10.0));
    }

    #[test]
    fn first_update_measures_from_origin() {
        let mut cam = OrbitCamera::default();
        cam.update(&held(&[Button::RightMouse], IVec2::new(10, 20)));
        assert!((cam.rotate() - Vec3::new(0.2, 0.1, 0.0)).length() < EPS);
    }

    #[test]
    fn extreme_pointer_jump_saturates() {
        let mut cam = OrbitCamera::default();
        cam.update(&held(&[], IVec2::splat(i32::MIN)));
        cam.update(&held(&[Button::RightMouse], IVec2::splat(i32::MAX)));
        let expected = i32::MAX as f32 * 0.01;
        assert!((cam.rotate().x - expected).abs() <= expected * 1e-6);
        assert!(cam.world_matrix().is_finite());
    }

    #[test]
    fn w_for_one_tick_moves_forward() {
        let mut cam = OrbitCamera::default();
        cam.update(&held(&[Button::W], IVec2::ZERO));
        let t = cam.translate();
        assert!((t.z - -9.8).abs() < EPS, "z = {}", t.z);
        assert_eq!(t.x, 0.0);
        assert_eq!(t.y, 0.0);
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut cam = OrbitCamera::default();
        cam.update(&held(
            &[Button::W, Button::S, Button::A, Button::D],
            IVec2::ZERO,
        ));
        assert_eq!(cam.translate(), Vec3::new(0.0, 0.0, -10.0));
    }

    #[test]
    fn strafe_follows_previous_orientation() {
        let mut cam = OrbitCamera::default();
        cam.set_rotate(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        cam.update(&held(&[Button::W], IVec2::ZERO));
        // Yawed a quarter turn, forward is world +X.
        let t = cam.translate();
        assert!((t - Vec3::new(0.2, 0.0, -10.0)).length() < EPS, "got {t:?}");
    }

    #[test]
    fn middle_drag_pans() {
        let mut cam = OrbitCamera::default();
        cam.update(&held(&[], IVec2::new(100, 100)));
        cam.update(&held(&[Button::MiddleMouse], IVec2::new(110, 95)));
        let t = cam.translate();
        assert!((t - Vec3::new(-1.0, -0.5, -10.0)).length() < EPS, "got {t:?}");
    }

    #[test]
    fn shift_locks_height() {
        let mut cam = OrbitCamera::default();
        cam.set_rotate(Vec3::new(0.7, 0.3, 0.0));
        let y = cam.translate().y;

        cam.update(&held(&[Button::LeftShift, Button::W], IVec2::ZERO));
        assert_eq!(cam.translate().y, y);

        cam.update(&held(
            &[Button::LeftShift, Button::MiddleMouse, Button::D],
            IVec2::new(40, -60),
        ));
        assert_eq!(cam.translate().y, y);
        assert_ne!(cam.translate().x, 0.0);
    }

    #[test]
    fn without_shift_pitched_forward_changes_height() {
        let mut cam = OrbitCamera::default();
        cam.set_rotate(Vec3::new(0.7, 0.0, 0.0));
        cam.update(&held(&[Button::W], IVec2::ZERO));
        assert_ne!(cam.translate().y, 0.0);
    }

    #[test]
    fn world_matrix_matches_fields_after_update() {
        let mut cam = OrbitCamera::default();
        cam.update(&held(&[Button::RightMouse, Button::D], IVec2::new(12, -7)));
        let expected = affine(Vec3::ONE, cam.rotate(), cam.translate());
        assert_eq!(cam.world_matrix(), expected);
    }

    #[test]
    fn view_is_inverse_of_world() {
        let mut cam = OrbitCamera::default();
        let inputs = [
            held(&[Button::RightMouse], IVec2::new(50, 30)),
            held(&[Button::RightMouse, Button::W], IVec2::new(-80, 140)),
            held(&[Button::MiddleMouse, Button::A], IVec2::new(10, 10)),
            held(&[Button::S, Button::LeftShift], IVec2::new(10, 10)),
        ];
        for input in &inputs {
            cam.update(input);
            let product = cam.view_matrix() * cam.world_matrix();
            assert!(approx_eq_mat4(&product, &Mat4::IDENTITY, 1e-4));
            let product = cam.world_matrix() * cam.view_matrix();
            assert!(approx_eq_mat4(&product, &Mat4::IDENTITY, 1e-4));
        }
    }

    #[test]
    fn view_is_not_negated_translation() {
        let mut cam = OrbitCamera::default();
        cam.set_rotate(Vec3::new(0.0, 1.0, 0.0));
        let naive = Mat4::from_translation(-cam.translate());
        assert!(!approx_eq_mat4(&cam.view_matrix(), &naive, 1e-3));
    }

    #[test]
    fn custom_config_scales_motion() {
        let config = CameraConfig {
            move_step: 1.0,
            ..CameraConfig::default()
        };
        let mut cam = OrbitCamera::new(config);
        cam.update(&held(&[Button::D], IVec2::ZERO));
        assert!((cam.translate() - Vec3::new(1.0, 0.0, -10.0)).length() < EPS);
    }

    #[test]
    fn initialize_resets_state() {
        let mut cam = OrbitCamera::default();
        cam.update(&held(&[Button::RightMouse, Button::W], IVec2::new(40, 40)));
        cam.initialize();
        assert_eq!(cam.rotate(), Vec3::ZERO);
        assert_eq!(cam.translate(), Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(cam.pointer_position(), IVec2::ZERO);
    }
}
