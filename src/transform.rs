//! Slow whole-field rotation.
//!
//! The host rotates the entire field around its centre: a steady yaw plus a
//! gentle pitch wobble. The rotation is a view-side transform and is never
//! applied to node, synapse or pulse positions.

use crate::config::RotationConfig;
use glam::{Mat4, Quat, Vec3};

/// Field orientation at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldTransform {
    /// Rotation about the Y axis in radians.
    pub yaw: f32,
    /// Rotation about the X axis in radians.
    pub pitch: f32,
}

impl FieldTransform {
    /// Orientation at `elapsed` seconds.
    pub fn at(elapsed: f32, config: &RotationConfig) -> Self {
        Self {
            yaw: elapsed * config.yaw_speed,
            pitch: (elapsed * config.wobble_frequency).sin() * config.wobble_amplitude,
        }
    }

    /// Rotation as a quaternion, pitch applied after yaw (XYZ Euler order).
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(glam::EulerRot::XYZ, self.pitch, self.yaw, 0.0)
    }

    /// Model matrix for the field group.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation())
    }

    /// Rotate a field-space point into world space.
    #[inline]
    pub fn apply(&self, point: Vec3) -> Vec3 {
        self.rotation() * point
    }
}
