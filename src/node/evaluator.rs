use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::blend::evaluator::BlendEvaluator;
use crate::eval::context::{CameraRigEvaluationInfo, EvaluationContext};
use crate::eval::pose::CameraPose;
use crate::eval::result::EvaluationResult;
use crate::foundation::archive::StateArchive;
use crate::foundation::error::CameraResult;
use crate::node::debug::{DebugBlockBuilder, ReferenceCollector};
use crate::node::storage::{EvaluatorBuilder, EvaluatorStorage};
use crate::variables::{VariableTable, VariableTableAllocationInfo};

/// Static, shareable description of one camera node.
///
/// A config node never changes while evaluators built from it are alive. Each activation of
/// a rig builds a fresh evaluator per node.
pub trait CameraNode: Any + fmt::Debug {
    fn name(&self) -> &str;

    /// Disabled nodes drop camera operations for their whole subtree.
    fn is_enabled(&self) -> bool {
        true
    }

    fn children(&self) -> Vec<Arc<dyn CameraNode>> {
        Vec::new()
    }

    /// Add the variables this node reads or writes.
    fn declare_variables(&self, _info: &mut VariableTableAllocationInfo) {}

    fn build_evaluator(self: Arc<Self>) -> Box<dyn NodeEvaluator>;
}

/// Count `node` and all of its descendants.
pub fn count_nodes(node: &Arc<dyn CameraNode>) -> usize {
    1 + node.children().iter().map(count_nodes).sum::<usize>()
}

bitflags::bitflags! {
    /// Which generic operations an evaluator handles itself.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    pub struct EvaluatorFlags: u8 {
        const NEEDS_PARAMETER_UPDATE = 1 << 0;
        const NEEDS_EVALUATION_UPDATE = 1 << 1;
        const SUPPORTS_OPERATIONS = 1 << 2;
    }
}

/// Index of an evaluator inside its [`EvaluatorStorage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EvaluatorId(pub(crate) u32);

impl EvaluatorId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Non-owning view of an evaluator's children.
pub type EvaluatorChildren = SmallVec<[EvaluatorId; 4]>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EvaluationType {
    #[default]
    Standard,
    /// Solving rig joints; nodes with side effects should skip them.
    Ik,
}

#[derive(Clone, Debug, Default)]
pub struct EvaluationParams {
    pub evaluation_context: Option<Rc<EvaluationContext>>,
    pub delta_time: f32,
    pub evaluation_type: EvaluationType,
    pub is_first_frame: bool,
}

pub struct InitializeParams<'a> {
    pub evaluation_context: Option<&'a Rc<EvaluationContext>>,
    /// The rig that was active before this tree was built.
    pub last_active_camera_rig: &'a CameraRigEvaluationInfo,
}

pub struct ParameterUpdateParams<'a> {
    pub evaluation: &'a EvaluationParams,
    /// Last frame's pose; this frame's pose is not known yet.
    pub last_camera_pose: &'a CameraPose,
}

pub struct ParameterUpdateResult<'a> {
    pub variable_table: &'a mut VariableTable,
}

#[derive(Clone, Debug, Default)]
pub struct OperationParams {
    pub evaluation_context: Option<Rc<EvaluationContext>>,
}

/// Nudges applied to a live evaluator tree from outside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraOperation {
    /// Add to the current yaw and pitch, in degrees.
    YawPitch { yaw: f64, pitch: f64 },
    /// Replace the current yaw and/or pitch, in degrees.
    SetYawPitch { yaw: Option<f64>, pitch: Option<f64> },
}

/// Runtime state of one camera node.
///
/// Every hook has a no-op default. Whether the generic tree walkers call a hook or forward
/// to the children instead is decided by [`NodeEvaluator::flags`]; see [`EvaluatorStorage`].
pub trait NodeEvaluator: Any + fmt::Debug {
    fn flags(&self) -> EvaluatorFlags {
        EvaluatorFlags::NEEDS_EVALUATION_UPDATE
    }

    fn children(&self) -> EvaluatorChildren {
        EvaluatorChildren::new()
    }

    /// Build child evaluators. Called once, right after creation.
    fn on_build(&mut self, _builder: &mut EvaluatorBuilder<'_>) {}

    fn on_initialize(&mut self, _params: &InitializeParams<'_>, _out: &mut EvaluationResult) {}

    fn on_update_parameters(
        &mut self,
        _tree: &mut EvaluatorStorage,
        _params: &ParameterUpdateParams<'_>,
        _out: &mut ParameterUpdateResult<'_>,
    ) {
    }

    fn on_run(
        &mut self,
        _tree: &mut EvaluatorStorage,
        _params: &EvaluationParams,
        _out: &mut EvaluationResult,
    ) {
    }

    fn on_execute_operation(
        &mut self,
        _tree: &mut EvaluatorStorage,
        _params: &OperationParams,
        _operation: &mut CameraOperation,
    ) {
    }

    fn on_collect_references(&self, _collector: &mut ReferenceCollector) {}

    fn on_serialize(&mut self, _archive: &mut StateArchive) -> CameraResult<()> {
        Ok(())
    }

    fn on_build_debug_blocks(&self, _builder: &mut DebugBlockBuilder) {}

    /// Blend evaluators return themselves here.
    fn as_blend_mut(&mut self) -> Option<&mut dyn BlendEvaluator> {
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/evaluator.rs"]
mod tests;
