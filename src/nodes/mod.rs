//! Built-in camera nodes used to assemble rigs.

pub mod array;
pub mod dampen;
pub mod field_of_view;
pub mod input2d;
pub mod offset;

pub use array::ArrayCameraNode;
pub use dampen::{CriticalDamper, DampenPositionCameraNode};
pub use field_of_view::FieldOfViewCameraNode;
pub use input2d::{Input2DCameraNode, yaw_pitch_rotation};
pub use offset::OffsetCameraNode;

#[cfg(test)]
#[path = "../../tests/unit/nodes/basic.rs"]
mod tests;
