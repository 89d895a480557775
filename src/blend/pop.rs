use std::sync::Arc;

use crate::blend::evaluator::{
    BlendEvaluator, BlendParams, BlendResult, PreBlendParams, PreBlendResult,
};
use crate::node::evaluator::{CameraNode, EvaluatorFlags, NodeEvaluator};
use crate::variables::VariableTableFilter;

/// Camera cut: the new rig replaces everything below it on its first frame.
#[derive(Clone, Debug, Default)]
pub struct PopBlendCameraNode;

impl PopBlendCameraNode {
    pub fn shared() -> Arc<dyn CameraNode> {
        Arc::new(Self)
    }
}

impl CameraNode for PopBlendCameraNode {
    fn name(&self) -> &str {
        "pop_blend"
    }

    fn build_evaluator(self: Arc<Self>) -> Box<dyn NodeEvaluator> {
        Box::new(PopBlendEvaluator)
    }
}

#[derive(Debug)]
pub struct PopBlendEvaluator;

impl NodeEvaluator for PopBlendEvaluator {
    fn flags(&self) -> EvaluatorFlags {
        EvaluatorFlags::empty()
    }

    fn as_blend_mut(&mut self) -> Option<&mut dyn BlendEvaluator> {
        Some(self)
    }
}

impl BlendEvaluator for PopBlendEvaluator {
    fn blend_parameters(&mut self, params: &PreBlendParams<'_>, out: &mut PreBlendResult<'_>) {
        out.variable_table
            .override_with(params.child_variable_table, VariableTableFilter::INPUT);
    }

    fn blend_results(&mut self, params: &BlendParams<'_>, out: &mut BlendResult<'_>) {
        out.blended_result.override_all(params.child_result);
        if params.evaluation.is_first_frame {
            out.blended_result.is_camera_cut = true;
        }
        out.is_blend_full = true;
        out.is_blend_finished = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/pop.rs"]
mod tests;
