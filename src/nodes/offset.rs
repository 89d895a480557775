use std::sync::Arc;

use crate::eval::result::EvaluationResult;
use crate::foundation::core::DVec3;
use crate::node::debug::DebugBlockBuilder;
use crate::node::evaluator::{CameraNode, EvaluationParams, NodeEvaluator};
use crate::node::storage::EvaluatorStorage;

/// Moves the camera in its own space (forward, right, up).
#[derive(Clone, Debug)]
pub struct OffsetCameraNode {
    pub offset: DVec3,
}

impl OffsetCameraNode {
    pub fn new(offset: DVec3) -> Self {
        Self { offset }
    }
}

impl CameraNode for OffsetCameraNode {
    fn name(&self) -> &str {
        "offset"
    }

    fn build_evaluator(self: Arc<Self>) -> Box<dyn NodeEvaluator> {
        Box::new(OffsetEvaluator { node: self })
    }
}

#[derive(Debug)]
pub struct OffsetEvaluator {
    node: Arc<OffsetCameraNode>,
}

impl NodeEvaluator for OffsetEvaluator {
    fn on_run(
        &mut self,
        _tree: &mut EvaluatorStorage,
        _params: &EvaluationParams,
        out: &mut EvaluationResult,
    ) {
        let pose = &mut out.camera_pose;
        let location = pose.transform().transform_point(self.node.offset);
        pose.set_location(location);
    }

    fn on_build_debug_blocks(&self, builder: &mut DebugBlockBuilder) {
        let o = self.node.offset;
        builder.add_text(format!("offset: ({:.1}, {:.1}, {:.1})", o.x, o.y, o.z));
    }
}
