use glam::{Mat4, Vec3};

/// Build an affine matrix from scale, Euler rotation (radians), and translation.
///
/// A point is scaled first, then rotated about X, Y and Z in that order, then
/// translated.
pub fn affine(scale: Vec3, rotate: Vec3, translate: Vec3) -> Mat4 {
    Mat4::from_translation(translate)
        * Mat4::from_rotation_z(rotate.z)
        * Mat4::from_rotation_y(rotate.y)
        * Mat4::from_rotation_x(rotate.x)
        * Mat4::from_scale(scale)
}

/// Transform a direction by the upper 3x3 of `m`, ignoring translation.
pub fn transform_normal(v: Vec3, m: &Mat4) -> Vec3 {
    m.transform_vector3(v)
}

/// True when every element of `a` and `b` differs by at most `eps`.
pub fn approx_eq_mat4(a: &Mat4, b: &Mat4, eps: f32) -> bool {
    a.to_cols_array()
        .iter()
        .zip(b.to_cols_array().iter())
        .all(|(x, y)| (x - y).abs() <= eps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn affine_identity() {
        let m = affine(Vec3::ONE, Vec3::ZERO, Vec3::ZERO);
        assert_eq!(m, Mat4::IDENTITY);
    }

    #[test]
    fn affine_translation_lands_in_last_column() {
        let m = affine(Vec3::ONE, Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn affine_scales_before_translating() {
        let m = affine(Vec3::splat(2.0), Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0));
        let p = m.transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!((p - Vec3::new(2.0, 0.0, -10.0)).length() < 1e-6);
    }

    #[test]
    fn rotation_order_is_x_then_y() {
        // +Y rotated 90 degrees about X goes to +Z, then 90 about Y goes to +X.
        let m = affine(Vec3::ONE, Vec3::new(FRAC_PI_2, FRAC_PI_2, 0.0), Vec3::ZERO);
        let v = m.transform_vector3(Vec3::Y);
        assert!((v - Vec3::X).length() < 1e-5, "got {v:?}");
    }

    #[test]
    fn transform_normal_ignores_translation() {
        let m = affine(Vec3::ONE, Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(transform_normal(Vec3::Z, &m), Vec3::Z);
    }

    #[test]
    fn transform_normal_follows_yaw() {
        let m = affine(Vec3::ONE, Vec3::new(0.0, FRAC_PI_2, 0.0), Vec3::ZERO);
        let v = transform_normal(Vec3::Z, &m);
        assert!((v - Vec3::X).length() < 1e-5, "got {v:?}");
    }

    #[test]
    fn approx_eq_tolerates_rounding() {
        let a = Mat4::IDENTITY;
        let mut cols = a.to_cols_array();
        cols[0] += 1e-7;
        assert!(approx_eq_mat4(&a, &Mat4::from_cols_array(&cols), 1e-5));
        cols[0] += 1.0;
        assert!(!approx_eq_mat4(&a, &Mat4::from_cols_array(&cols), 1e-5));
    }
}
