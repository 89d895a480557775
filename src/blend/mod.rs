//! Blending between camera rigs: blend nodes, the per-entry wrapper and the blend stack.

pub mod ease;
pub mod evaluator;
pub mod pop;
pub mod root;
pub mod simple;
pub mod stack;

pub use ease::BlendEase;
pub use evaluator::{BlendEvaluator, BlendParams, BlendResult, PreBlendParams, PreBlendResult};
pub use pop::PopBlendCameraNode;
pub use root::BlendStackRootCameraNode;
pub use simple::SimpleBlendCameraNode;
pub use stack::{
    BlendStackCameraNode, BlendStackEvaluator, BlendStackPushParams, BlendStackRigEvent,
    BlendStackRigEventType, PushOutcome,
};
