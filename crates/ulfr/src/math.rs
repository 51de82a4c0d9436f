//! Math re-exports and the [`Transform`] component.
//!
//! Vector, matrix and quaternion maths come from [glam](https://docs.rs/glam);
//! the engine core treats them as plain values.

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use serde::{Deserialize, Serialize};

/// Placement of an entity: position, rotation and scale.
///
/// Every entity created through [`EntityList::create_entity`](crate::ecs::EntityList::create_entity)
/// starts with [`Transform::IDENTITY`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Model matrix (scale, then rotation, then translation).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Moves the transform by `offset` in world space.
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_matrix() {
        assert_eq!(Transform::IDENTITY.matrix(), Mat4::IDENTITY);
        assert_eq!(Transform::default(), Transform::IDENTITY);
    }

    #[test]
    fn translation_lands_in_last_column() {
        let t = Transform::from_xyz(1.0, 2.0, 3.0).with_scale(Vec3::splat(2.0));
        let col = t.matrix().col(3);
        assert_eq!((col.x, col.y, col.z), (1.0, 2.0, 3.0));
    }
}
