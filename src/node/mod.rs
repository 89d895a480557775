//! Camera node evaluators and the arena that owns them.

pub mod debug;
pub mod evaluator;
pub mod storage;

pub use debug::{DebugBlockBuilder, ReferenceCollector};
pub use evaluator::{
    CameraNode, CameraOperation, EvaluationParams, EvaluationType, EvaluatorChildren,
    EvaluatorFlags, EvaluatorId, InitializeParams, NodeEvaluator, OperationParams,
    ParameterUpdateParams, ParameterUpdateResult,
};
pub use storage::{EvaluatorAllocationInfo, EvaluatorBuilder, EvaluatorStorage};
