//! camblend evaluates camera rigs once per frame and blends between them.
//!
//! # Evaluation overview
//!
//! 1. **Configure**: camera nodes are immutable, shareable descriptions ([`CameraNode`]);
//!    a [`CameraRigAsset`] is a named tree of them plus its enter/exit transitions.
//! 2. **Instantiate**: activating a rig builds one [`NodeEvaluator`] per node into an
//!    [`EvaluatorStorage`] arena. Evaluators refer to each other by [`EvaluatorId`].
//! 3. **Blend**: a [`BlendStackEvaluator`] keeps every rig that is blending in, bottom to
//!    top, and runs them in five ordered passes (parameters, input pre-blend, rigs, result
//!    blend, retirement) into one [`EvaluationResult`].
//! 4. **Drive**: [`CameraSystemEvaluator`] picks the active [`EvaluationContext`], asks its
//!    director which rigs to run, and evaluates the layered root node.
//!
//! Variables travel alongside the pose in a typed [`VariableTable`]; inputs are blended
//! before rigs run, outputs after.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded frames**: contexts are `Rc` and observed weakly; a lost context
//!   freezes its rigs instead of failing the frame.
//! - **Errors are values**: configuration problems surface as [`CameraError`]; per-frame
//!   evaluation logs through `tracing` and degrades in place.
#![forbid(unsafe_code)]

pub mod asset;
pub mod blend;
pub mod eval;
pub mod foundation;
pub mod node;
pub mod nodes;
pub mod system;
pub mod variables;

pub use asset::{
    AssetBuildEvent, CameraAsset, CameraRigAsset, CameraRigTransition, PackageId,
    TransitionCondition, TransitionConditionMatchParams,
};
pub use blend::{
    BlendEase, BlendEvaluator, BlendStackCameraNode, BlendStackEvaluator, BlendStackPushParams,
    BlendStackRigEvent, BlendStackRigEventType, PopBlendCameraNode, PushOutcome,
    SimpleBlendCameraNode,
};
pub use eval::context::{CameraRigEvaluationInfo, ContextStack, EvaluationContext};
pub use eval::director::{
    CameraDirectorEvaluator, CameraDirectorHandle, DirectorEvaluationParams,
    DirectorEvaluationResult, SingleCameraDirector, SwitchableCameraDirector,
};
pub use eval::pose::CameraPose;
pub use eval::result::{CameraRigJoints, EvaluationResult};
pub use foundation::archive::StateArchive;
pub use foundation::core::{DQuat, DVec3, Transform3, Vec2};
pub use foundation::error::{CameraError, CameraResult};
pub use node::{
    CameraNode, CameraOperation, EvaluationParams, EvaluationType, EvaluatorFlags, EvaluatorId,
    EvaluatorStorage, NodeEvaluator,
};
pub use system::{
    AutoResetCameraVariableService, BlendStackSettings, CameraEvaluationService, CameraRigLayer,
    CameraSystemEvaluator, CameraSystemSettings, CameraView, RootCameraRigEvent,
    RootCameraRigEventType,
};
pub use variables::{VariableDefinition, VariableId, VariableTable, VariableType, VariableValue};
