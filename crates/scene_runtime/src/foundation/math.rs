//! Math utilities and types
//!
//! Thin aliases over `nalgebra` plus the TRS transform used by the scene
//! hierarchy when composing local-to-world matrices.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Linear RGBA color
pub type Color = Vec4;

/// Opaque white, the default sprite tint
pub fn white() -> Color {
    Color::new(1.0, 1.0, 1.0, 1.0)
}

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Decompose a TRS matrix.
    ///
    /// Shear is discarded; a zero scale axis yields an identity rotation.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let position = Vec3::new(matrix.m14, matrix.m24, matrix.m34);

        let scale_x = Vec3::new(matrix.m11, matrix.m21, matrix.m31).magnitude();
        let scale_y = Vec3::new(matrix.m12, matrix.m22, matrix.m32).magnitude();
        let scale_z = Vec3::new(matrix.m13, matrix.m23, matrix.m33).magnitude();
        let scale = Vec3::new(scale_x, scale_y, scale_z);

        if scale_x <= f32::EPSILON || scale_y <= f32::EPSILON || scale_z <= f32::EPSILON {
            return Self {
                position,
                rotation: Quat::identity(),
                scale,
            };
        }

        let rotation_matrix = Mat3::new(
            matrix.m11 / scale_x, matrix.m12 / scale_y, matrix.m13 / scale_z,
            matrix.m21 / scale_x, matrix.m22 / scale_y, matrix.m23 / scale_z,
            matrix.m31 / scale_x, matrix.m32 / scale_y, matrix.m33 / scale_z,
        );
        let rotation = Quat::from_matrix(&rotation_matrix);

        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Combine this (parent) transform with a child transform
    pub fn combine(&self, child: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * (self.scale.component_mul(&child.position)),
            rotation: self.rotation * child.rotation,
            scale: self.scale.component_mul(&child.scale),
        }
    }

    /// Get the inverse transform
    pub fn inverse(&self) -> Transform {
        let inv_scale = Vec3::new(1.0 / self.scale.x, 1.0 / self.scale.y, 1.0 / self.scale.z);
        let inv_rotation = self.rotation.inverse();
        let inv_position = inv_rotation * (-self.position.component_mul(&inv_scale));

        Transform {
            position: inv_position,
            rotation: inv_rotation,
            scale: inv_scale,
        }
    }
}

/// Build a rotation from XYZ Euler angles in radians
pub fn quat_from_euler(angles: Vec3) -> Quat {
    Quat::from_euler_angles(angles.x, angles.y, angles.z)
}

/// Extract XYZ Euler angles in radians
pub fn euler_from_quat(rotation: &Quat) -> Vec3 {
    let (roll, pitch, yaw) = rotation.euler_angles();
    Vec3::new(roll, pitch, yaw)
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_combine_translates_child_into_parent_space() {
        let parent = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
        let child = Transform::from_position(Vec3::new(0.0, 1.0, 0.0));

        let combined = parent.combine(&child);
        assert_relative_eq!(combined.position, Vec3::new(1.0, 1.0, 0.0), epsilon = 1e-6);

        let via_matrix = parent.to_matrix() * child.to_matrix();
        assert_relative_eq!(via_matrix, combined.to_matrix(), epsilon = 1e-6);
    }

    #[test]
    fn test_matrix_decomposition() {
        let original = Transform {
            position: Vec3::new(2.0, -1.0, 0.5),
            rotation: quat_from_euler(Vec3::new(0.0, 0.0, 0.75)),
            scale: Vec3::new(2.0, 3.0, 1.0),
        };

        let decomposed = Transform::from_matrix(original.to_matrix());
        assert_relative_eq!(decomposed.position, original.position, epsilon = 1e-5);
        assert_relative_eq!(decomposed.scale, original.scale, epsilon = 1e-5);
        assert!(decomposed.rotation.angle_to(&original.rotation) < 1e-4);
    }

    #[test]
    fn test_inverse_cancels() {
        let transform = Transform {
            position: Vec3::new(3.0, 4.0, 0.0),
            rotation: quat_from_euler(Vec3::new(0.0, 0.0, constants::PI / 3.0)),
            scale: Vec3::new(2.0, 2.0, 2.0),
        };

        let identity = transform.combine(&transform.inverse());
        assert_relative_eq!(identity.position, Vec3::zeros(), epsilon = 1e-5);
        assert_relative_eq!(identity.scale, Vec3::new(1.0, 1.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_euler_roundtrip_z_only() {
        let rotation = quat_from_euler(Vec3::new(0.0, 0.0, 1.2));
        assert_relative_eq!(euler_from_quat(&rotation).z, 1.2, epsilon = 1e-5);
    }
}
