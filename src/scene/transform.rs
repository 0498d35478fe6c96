//! Position, scale, and rotation of scene objects

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// World-space placement of an object.
///
/// Rotation is stored as an angle around an axis, which covers the
/// common cases (spin around Y for characters, tumble around an
/// arbitrary axis for debris) while staying trivially serializable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
    /// Per-axis scale factor
    pub scale: Vec3,
    /// Axis the rotation turns around
    pub rotation_axis: Vec3,
    /// Rotation angle in degrees
    pub rotation_degrees: f32,
}

impl Transform {
    /// Create a transform at the origin with unit scale.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with just a position.
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set the scale.
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Set the rotation as an angle around an axis.
    #[must_use]
    pub fn with_rotation(mut self, axis: Vec3, degrees: f32) -> Self {
        self.rotation_axis = axis;
        self.rotation_degrees = degrees;
        self
    }

    /// Move by a delta.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Rotation as a quaternion.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        let axis = self.rotation_axis.normalize_or_zero();
        if axis == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_axis_angle(axis, self.rotation_degrees.to_radians())
        }
    }

    /// Model matrix combining scale, rotation, and translation.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation(), self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation_axis: Vec3::Y,
            rotation_degrees: 0.0,
        }
    }
}

/// Two-dimensional counterpart of [`Transform`] for sprites and UI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform2D {
    /// Position in screen or world units
    pub position: Vec2,
    /// Per-axis scale factor
    pub scale: Vec2,
    /// Rotation angle in degrees, counterclockwise
    pub rotation_degrees: f32,
}

impl Transform2D {
    /// Create a transform at the origin with unit scale.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with just a position.
    #[must_use]
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Model matrix for 2D rendering (rotation around Z).
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale.extend(1.0),
            Quat::from_rotation_z(self.rotation_degrees.to_radians()),
            self.position.extend(0.0),
        )
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation_degrees: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_matrix() {
        let t = Transform::new();
        assert!(t.to_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn test_translation_moves_points() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let p = t.to_matrix().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn test_rotation_around_y() {
        let t = Transform::new().with_rotation(Vec3::Y, 90.0);
        let p = t.to_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn test_zero_axis_is_identity_rotation() {
        let t = Transform::new().with_rotation(Vec3::ZERO, 45.0);
        assert_eq!(t.rotation(), Quat::IDENTITY);
    }
}
