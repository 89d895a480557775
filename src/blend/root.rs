use std::sync::Arc;

use crate::eval::result::EvaluationResult;
use crate::node::evaluator::{
    CameraNode, EvaluationParams, EvaluatorChildren, EvaluatorId, NodeEvaluator,
};
use crate::node::storage::{EvaluatorBuilder, EvaluatorStorage};

/// Per-entry wrapper pairing a transition's blend with the rig it blends in.
#[derive(Debug)]
pub struct BlendStackRootCameraNode {
    pub blend: Option<Arc<dyn CameraNode>>,
    pub rig_root: Option<Arc<dyn CameraNode>>,
}

impl BlendStackRootCameraNode {
    pub fn new(blend: Arc<dyn CameraNode>, rig_root: Option<Arc<dyn CameraNode>>) -> Self {
        Self {
            blend: Some(blend),
            rig_root,
        }
    }
}

impl CameraNode for BlendStackRootCameraNode {
    fn name(&self) -> &str {
        "blend_stack_root"
    }

    fn children(&self) -> Vec<Arc<dyn CameraNode>> {
        self.blend.iter().chain(self.rig_root.iter()).cloned().collect()
    }

    fn build_evaluator(self: Arc<Self>) -> Box<dyn NodeEvaluator> {
        Box::new(BlendStackRootEvaluator {
            node: self,
            blend: None,
            rig_root: None,
        })
    }
}

#[derive(Debug)]
pub struct BlendStackRootEvaluator {
    node: Arc<BlendStackRootCameraNode>,
    blend: Option<EvaluatorId>,
    rig_root: Option<EvaluatorId>,
}

impl BlendStackRootEvaluator {
    pub fn blend_evaluator(&self) -> Option<EvaluatorId> {
        self.blend
    }

    pub fn rig_root_evaluator(&self) -> Option<EvaluatorId> {
        self.rig_root
    }
}

impl NodeEvaluator for BlendStackRootEvaluator {
    fn children(&self) -> EvaluatorChildren {
        self.blend.iter().chain(self.rig_root.iter()).copied().collect()
    }

    fn on_build(&mut self, builder: &mut EvaluatorBuilder<'_>) {
        // Blend first: the stack relies on this order.
        self.blend = builder.build_optional(self.node.blend.as_ref());
        self.rig_root = builder.build_optional(self.node.rig_root.as_ref());
    }

    /// Only used outside a blend stack, which drives both halves itself.
    fn on_run(
        &mut self,
        tree: &mut EvaluatorStorage,
        params: &EvaluationParams,
        out: &mut EvaluationResult,
    ) {
        if let Some(blend) = self.blend {
            tree.run(blend, params, out);
        }
        if let Some(rig_root) = self.rig_root {
            tree.run(rig_root, params, out);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/root.rs"]
mod tests;
