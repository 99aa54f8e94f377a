use glam::{Mat4, Vec3};
use orbitframe_common::Transform;

/// Vertical field of view of the 3D pass, in radians.
pub const SPHERE_FOV_Y: f32 = 0.45;
const SPHERE_NEAR: f32 = 0.1;
const SPHERE_FAR: f32 = 100.0;

/// Sprite quad size in pixels.
pub const SPRITE_SIZE: [f32; 2] = [640.0, 360.0];

/// Drawable size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// Directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub color: [f32; 4],
    pub direction: Vec3,
    pub intensity: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            direction: Vec3::new(0.0, -1.0, 0.0),
            intensity: 1.0,
        }
    }
}

/// Surface tint and whether the light affects it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: [f32; 4],
    pub lit: bool,
}

impl Material {
    pub const fn unlit() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            lit: false,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            lit: true,
        }
    }
}

/// Everything the debug panel can tweak outside the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    pub sphere: Transform,
    pub sphere_material: Material,
    pub sprite: Transform,
    pub sprite_material: Material,
    pub lighting: Lighting,
    pub show_sprite: bool,
    /// Radians added to the sphere's yaw per frame.
    pub spin: f32,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            sphere: Transform::default(),
            sphere_material: Material::default(),
            sprite: Transform::default(),
            sprite_material: Material::unlit(),
            lighting: Lighting::default(),
            show_sprite: true,
            spin: 0.0,
        }
    }
}

impl SceneState {
    /// Per-frame scene animation.
    pub fn advance(&mut self) {
        if self.spin != 0.0 {
            self.sphere.rotate.y += self.spin;
        }
    }
}

/// Matrices one object's constant buffer receives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTransforms {
    pub wvp: Mat4,
    pub world: Mat4,
}

/// Constant-buffer contents for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneTransforms {
    pub sphere: ObjectTransforms,
    pub sprite: ObjectTransforms,
}

impl SceneTransforms {
    /// Combine object placement with the camera and projection.
    ///
    /// The sphere goes through the camera's view (inverse of its world matrix)
    /// and a perspective projection; the sprite uses an identity view and a
    /// pixel-space orthographic projection.
    pub fn compute(camera_world: Mat4, scene: &SceneState, viewport: Viewport) -> Self {
        let view = camera_world.inverse();
        let projection =
            Mat4::perspective_lh(SPHERE_FOV_Y, viewport.aspect(), SPHERE_NEAR, SPHERE_FAR);
        let sphere_world = scene.sphere.to_matrix();

        let sprite_world = scene.sprite.to_matrix();
        let ortho = Mat4::orthographic_lh(
            0.0,
            viewport.width as f32,
            viewport.height as f32,
            0.0,
            0.0,
            100.0,
        );

        Self {
            sphere: ObjectTransforms {
                wvp: projection * view * sphere_world,
                world: sphere_world,
            },
            sprite: ObjectTransforms {
                wvp: ortho * sprite_world,
                world: sprite_world,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec4, Vec4Swizzles};
    use orbitframe_camera::OrbitCamera;

    fn ndc(m: Mat4, p: Vec3) -> Vec3 {
        let clip = m * Vec4::new(p.x, p.y, p.z, 1.0);
        clip.xyz() / clip.w
    }

    #[test]
    fn viewport_never_zero() {
        let v = Viewport::new(0, 0);
        assert_eq!(v.width, 1);
        assert_eq!(v.height, 1);
        assert_eq!(Viewport::default().aspect(), 1280.0 / 720.0);
    }

    #[test]
    fn sphere_centered_in_front_of_default_camera() {
        let camera = OrbitCamera::default();
        let scene = SceneState::default();
        let t = SceneTransforms::compute(camera.world_matrix(), &scene, Viewport::default());

        let center = ndc(t.sphere.wvp, Vec3::ZERO);
        assert!(center.x.abs() < 1e-5);
        assert!(center.y.abs() < 1e-5);
        assert!(center.z > 0.0 && center.z < 1.0, "depth {}", center.z);
    }

    #[test]
    fn object_behind_camera_is_clipped() {
        let camera = OrbitCamera::default();
        let scene = SceneState {
            sphere: Transform::from_translation(Vec3::new(0.0, 0.0, -20.0)),
            ..SceneState::default()
        };
        let t = SceneTransforms::compute(camera.world_matrix(), &scene, Viewport::default());
        let clip = t.sphere.wvp * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.w < 0.0);
    }

    #[test]
    fn sprite_maps_pixels_to_ndc() {
        let scene = SceneState::default();
        let t = SceneTransforms::compute(Mat4::IDENTITY, &scene, Viewport::new(1280, 720));

        let top_left = ndc(t.sprite.wvp, Vec3::ZERO);
        assert!((top_left - Vec3::new(-1.0, 1.0, 0.0)).length() < 1e-5);
        let bottom_right = ndc(t.sprite.wvp, Vec3::new(1280.0, 720.0, 0.0));
        assert!((bottom_right - Vec3::new(1.0, -1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn sprite_ignores_camera() {
        let scene = SceneState::default();
        let mut camera = OrbitCamera::default();
        camera.set_rotate(Vec3::new(0.3, 1.2, 0.0));
        let a = SceneTransforms::compute(Mat4::IDENTITY, &scene, Viewport::default());
        let b = SceneTransforms::compute(camera.world_matrix(), &scene, Viewport::default());
        assert_eq!(a.sprite, b.sprite);
        assert_ne!(a.sphere.wvp, b.sphere.wvp);
    }

    #[test]
    fn advance_spins_sphere() {
        let mut scene = SceneState {
            spin: 0.03,
            ..SceneState::default()
        };
        scene.advance();
        scene.advance();
        assert!((scene.sphere.rotate.y - 0.06).abs() < 1e-6);
    }

    #[test]
    fn world_matrix_passes_through() {
        let scene = SceneState {
            sphere: Transform::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            ..SceneState::default()
        };
        let t = SceneTransforms::compute(Mat4::IDENTITY, &scene, Viewport::default());
        assert_eq!(t.sphere.world, scene.sphere.to_matrix());
    }
}
