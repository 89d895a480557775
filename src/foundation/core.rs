use crate::foundation::math::Lerp;

pub use glam::{DQuat, DVec3};
pub use kurbo::Vec2;

/// Rigid transform with non-uniform scale.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform3 {
    pub translation: DVec3,
    pub rotation: DQuat,
    pub scale: DVec3,
}

impl Default for Transform3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform3 {
    pub const IDENTITY: Self = Self {
        translation: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
        scale: DVec3::ONE,
    };

    pub fn from_translation_rotation(translation: DVec3, rotation: DQuat) -> Self {
        Self {
            translation,
            rotation,
            scale: DVec3::ONE,
        }
    }

    /// Map a point from local space into the space this transform lives in.
    pub fn transform_point(&self, p: DVec3) -> DVec3 {
        self.translation + self.rotation * (p * self.scale)
    }

    /// Rotate a direction, ignoring translation and scale.
    pub fn transform_vector_no_scale(&self, v: DVec3) -> DVec3 {
        self.rotation * v
    }
}

impl Lerp for Transform3 {
    // Rotation goes through slerp; a per-component quaternion lerp would shear the basis.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            translation: <DVec3 as Lerp>::lerp(&a.translation, &b.translation, t),
            rotation: <DQuat as Lerp>::lerp(&a.rotation, &b.rotation, t),
            scale: <DVec3 as Lerp>::lerp(&a.scale, &b.scale, t),
        }
    }
}

/// Camera-space basis: forward is +X, right is +Y, up is +Z.
pub mod axis {
    use glam::DVec3;

    pub const FORWARD: DVec3 = DVec3::X;
    pub const RIGHT: DVec3 = DVec3::Y;
    pub const UP: DVec3 = DVec3::Z;
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
