use glam::{Mat4, Vec3};

/// Placement of one mesh. Rotation is in degrees and applied about X, then
/// Y, then Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: Vec3,
    pub rotation_degrees: Vec3,
    pub position: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    pub fn new() -> Self {
        Self {
            scale: Vec3::ONE,
            rotation_degrees: Vec3::ZERO,
            position: Vec3::ZERO,
        }
    }

    pub fn from_parts(scale: Vec3, rotation_degrees: Vec3, position: Vec3) -> Self {
        Self {
            scale,
            rotation_degrees,
            position,
        }
    }

    /// `T * Rz * Ry * Rx * S`
    pub fn to_matrix(&self) -> Mat4 {
        let scale = Mat4::from_scale(self.scale);
        let rotation_x = Mat4::from_rotation_x(self.rotation_degrees.x.to_radians());
        let rotation_y = Mat4::from_rotation_y(self.rotation_degrees.y.to_radians());
        let rotation_z = Mat4::from_rotation_z(self.rotation_degrees.z.to_radians());
        let translation = Mat4::from_translation(self.position);
        translation * rotation_z * rotation_y * rotation_x * scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::{Vec4, Vec4Swizzles};

    fn assert_mat_eq(a: Mat4, b: Mat4) {
        for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_transform_new() {
        let transform = Transform::new();
        assert_eq!(transform.position, Vec3::ZERO);
        assert_eq!(transform.rotation_degrees, Vec3::ZERO);
        assert_eq!(transform.scale, Vec3::ONE);
        assert_eq!(transform.to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_unit_scale_no_rotation_is_pure_translation() {
        let transform = Transform::from_parts(Vec3::ONE, Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        assert_mat_eq(transform.to_matrix(), Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_scale_lands_on_diagonal() {
        let transform = Transform::from_parts(Vec3::new(21.0, 1.0, 14.0), Vec3::ZERO, Vec3::ZERO);
        let matrix = transform.to_matrix();
        assert_eq!(matrix.col(0).x, 21.0);
        assert_eq!(matrix.col(1).y, 1.0);
        assert_eq!(matrix.col(2).z, 14.0);
    }

    #[test]
    fn test_composition_order() {
        let scale = Vec3::new(2.0, 3.0, 4.0);
        let rotation = Vec3::new(30.0, 45.0, 60.0);
        let position = Vec3::new(-5.0, 7.0, 1.5);
        let transform = Transform::from_parts(scale, rotation, position);

        let expected = Mat4::from_translation(position)
            * Mat4::from_rotation_z(60f32.to_radians())
            * Mat4::from_rotation_y(45f32.to_radians())
            * Mat4::from_rotation_x(30f32.to_radians())
            * Mat4::from_scale(scale);
        assert_mat_eq(transform.to_matrix(), expected);

        // Reversing the rotation order gives a different placement.
        let reversed = Mat4::from_translation(position)
            * Mat4::from_rotation_x(30f32.to_radians())
            * Mat4::from_rotation_y(45f32.to_radians())
            * Mat4::from_rotation_z(60f32.to_radians())
            * Mat4::from_scale(scale);
        assert_ne!(transform.to_matrix(), reversed);
    }

    #[test]
    fn test_wall_rotation_stands_plane_upright() {
        // A floor plane rotated 90 degrees about X faces +Z.
        let transform = Transform::from_parts(Vec3::ONE, Vec3::new(90.0, 0.0, 0.0), Vec3::ZERO);
        let normal = transform.to_matrix() * Vec4::new(0.0, 1.0, 0.0, 0.0);
        assert_relative_eq!(normal.xyz().z, 1.0, epsilon = 1e-5);
        assert_relative_eq!(normal.xyz().y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_scale_applies_before_translation() {
        let transform = Transform::from_parts(Vec3::splat(2.0), Vec3::ZERO, Vec3::new(0.0, 14.0, 0.0));
        let point = transform.to_matrix().transform_point3(Vec3::new(0.0, 0.5, 0.0));
        assert_relative_eq!(point.y, 15.0, epsilon = 1e-5);
    }
}
