//! Value: runtime instances written to rig channels and stored in keyframes.
//! All numeric types use f32.

use glam::{Mat3, Quat};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Float,
    Vec3,
    Quat,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Value {
    /// Scalar float (morph influence)
    Float(f32),

    /// 3D vector (Euler rotation in radians, XYZ order)
    Vec3([f32; 3]),

    /// Quaternion (x, y, z, w)
    Quat([f32; 4]),
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Quat(_) => ValueKind::Quat,
        }
    }

    pub fn f(v: f32) -> Self {
        Value::Float(v)
    }

    pub fn quat(x: f32, y: f32, z: f32, w: f32) -> Self {
        Value::Quat([x, y, z, w])
    }
}

/// Euler rotation in radians, applied in XYZ order.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Euler {
    pub const ZERO: Euler = Euler {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Every component divided by `divisor`.
    pub fn scaled(self, divisor: f32) -> Self {
        Self::new(self.x / divisor, self.y / divisor, self.z / divisor)
    }

    pub fn offset(self, bias: [f32; 3]) -> Self {
        Self::new(self.x + bias[0], self.y + bias[1], self.z + bias[2])
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Quaternion `[x, y, z, w]` equal to `Rx * Ry * Rz`.
    pub fn to_quat(self) -> [f32; 4] {
        let q = Quat::from_rotation_x(self.x)
            * Quat::from_rotation_y(self.y)
            * Quat::from_rotation_z(self.z);
        q.to_array()
    }

    /// Inverse of [`Euler::to_quat`] for unit quaternions.
    pub fn from_quat(q: Quat) -> Self {
        Self::from_rotation_matrix(&Mat3::from_quat(q.normalize()))
    }

    /// XYZ decomposition of a pure rotation matrix. Near gimbal lock
    /// (|m13| ~ 1) the z angle is pinned to 0.
    pub fn from_rotation_matrix(m: &Mat3) -> Self {
        let m11 = m.x_axis.x;
        let m12 = m.y_axis.x;
        let m13 = m.z_axis.x;
        let m22 = m.y_axis.y;
        let m23 = m.z_axis.y;
        let m32 = m.y_axis.z;
        let m33 = m.z_axis.z;

        let y = m13.clamp(-1.0, 1.0).asin();
        if m13.abs() < 0.999_999_9 {
            Self::new((-m23).atan2(m33), y, (-m12).atan2(m11))
        } else {
            Self::new(m32.atan2(m22), y, 0.0)
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Euler {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}
