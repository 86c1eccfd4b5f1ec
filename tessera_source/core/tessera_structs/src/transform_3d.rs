use crate::{Quaternion, Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3D {
    pub position: Vector3,
    pub scale: Vector3,
    pub rotation: Quaternion,
}

impl Transform3D {
    pub const IDENTITY: Self = Self {
        position: Vector3::ZERO,
        scale: Vector3::ONE,
        rotation: Quaternion::IDENTITY,
    };

    #[inline]
    pub const fn new(pos: Vector3, rot: Quaternion, scale: Vector3) -> Self {
        Self {
            position: pos,
            scale,
            rotation: rot,
        }
    }

    /// Build from a descriptor-style position / XYZ Euler rotation / scale triple.
    #[inline]
    pub fn from_euler(position: Vector3, rotation: Vector3, scale: Vector3) -> Self {
        Self::new(position, Quaternion::from_euler(rotation), scale)
    }

    /// World transform of a child whose local transform is `self`, placed under `parent`.
    ///
    /// Composed per component, so a zero or negative parent scale never leaks into
    /// the rotation.
    #[inline]
    pub fn under(&self, parent: &Transform3D) -> Self {
        let parent_rotation = parent.rotation.to_quat();
        let parent_scale = parent.scale.to_glam();
        let offset = parent_rotation * (parent_scale * self.position.to_glam());
        Self {
            position: (parent.position.to_glam() + offset).into(),
            scale: (parent_scale * self.scale.to_glam()).into(),
            rotation: (parent_rotation * self.rotation.to_quat()).normalize().into(),
        }
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::IDENTITY
    }
}
