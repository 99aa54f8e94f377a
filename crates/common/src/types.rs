use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::math::affine;

/// Spatial transform: scale, Euler rotation in radians, translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: Vec3,
    pub rotate: Vec3,
    pub translate: Vec3,
}

impl Transform {
    pub fn from_translation(translate: Vec3) -> Self {
        Self {
            translate,
            ..Self::default()
        }
    }

    /// Affine matrix placing an object with this transform in world space.
    pub fn to_matrix(&self) -> Mat4 {
        affine(self.scale, self.rotate, self.translate)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            rotate: Vec3::ZERO,
            translate: Vec3::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.rotate, Vec3::ZERO);
        assert_eq!(t.translate, Vec3::ZERO);
        assert_eq!(t.to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn from_translation_keeps_unit_scale() {
        let t = Transform::from_translation(Vec3::new(0.0, 1.0, 2.0));
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.to_matrix().w_axis.truncate(), Vec3::new(0.0, 1.0, 2.0));
    }
}
