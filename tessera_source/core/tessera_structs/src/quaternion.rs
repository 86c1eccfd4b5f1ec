use crate::Vector3;
use glam::{EulerRot, Quat};

/// A quaternion representing rotation in 3D space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl std::fmt::Display for Quaternion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Quaternion({}, {}, {}, {})",
            self.x, self.y, self.z, self.w
        )
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation from XYZ Euler angles in radians, the order scene files are authored in.
    #[inline]
    pub fn from_euler(euler: Vector3) -> Self {
        Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z).into()
    }

    /// Back to XYZ Euler angles in radians.
    #[inline]
    pub fn to_euler(self) -> Vector3 {
        let (x, y, z) = self.to_quat().to_euler(EulerRot::XYZ);
        Vector3::new(x, y, z)
    }

    /// Convert to glam Quat
    #[inline]
    pub fn to_quat(self) -> Quat {
        Quat::from_xyzw(self.x, self.y, self.z, self.w)
    }

    /// Create from glam Quat
    #[inline]
    pub fn from_quat(quat: Quat) -> Self {
        Self {
            x: quat.x,
            y: quat.y,
            z: quat.z,
            w: quat.w,
        }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Quat> for Quaternion {
    fn from(q: Quat) -> Self {
        Self::from_quat(q)
    }
}

impl From<Quaternion> for Quat {
    fn from(q: Quaternion) -> Self {
        q.to_quat()
    }
}
