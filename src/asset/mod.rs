//! Read-only camera configuration: rigs, camera assets and transitions.

pub mod camera;
pub mod package;
pub mod rig;
pub mod transition;

pub use camera::CameraAsset;
pub use package::{AssetBuildEvent, PackageId};
pub use rig::{CameraRigAllocationInfo, CameraRigAsset, CameraRigAssetBuilder};
pub use transition::{
    CameraRigTransition, FrozenSourceCondition, NextRigCondition, PreviousRigCondition,
    TransitionCondition, TransitionConditionMatchParams,
};
