use std::sync::Arc;

use crate::blend::ease::BlendEase;
use crate::blend::evaluator::{
    BlendEvaluator, BlendParams, BlendResult, PreBlendParams, PreBlendResult,
};
use crate::eval::result::EvaluationResult;
use crate::foundation::archive::StateArchive;
use crate::foundation::error::CameraResult;
use crate::node::debug::DebugBlockBuilder;
use crate::node::evaluator::{CameraNode, EvaluationParams, NodeEvaluator};
use crate::node::storage::EvaluatorStorage;
use crate::variables::VariableTableFilter;

/// Time-based blend with an easing curve.
#[derive(Clone, Debug)]
pub struct SimpleBlendCameraNode {
    /// Seconds; non-positive blends in on the first frame.
    pub duration: f32,
    pub ease: BlendEase,
}

impl SimpleBlendCameraNode {
    pub fn new(duration: f32, ease: BlendEase) -> Self {
        Self { duration, ease }
    }

    pub fn shared(duration: f32, ease: BlendEase) -> Arc<dyn CameraNode> {
        Arc::new(Self::new(duration, ease))
    }
}

impl CameraNode for SimpleBlendCameraNode {
    fn name(&self) -> &str {
        "simple_blend"
    }

    fn build_evaluator(self: Arc<Self>) -> Box<dyn NodeEvaluator> {
        Box::new(SimpleBlendEvaluator {
            node: self,
            current_time: 0.0,
            blend_factor: 0.0,
        })
    }
}

#[derive(Debug)]
pub struct SimpleBlendEvaluator {
    node: Arc<SimpleBlendCameraNode>,
    current_time: f32,
    blend_factor: f64,
}

impl SimpleBlendEvaluator {
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn blend_factor(&self) -> f64 {
        self.blend_factor
    }

    fn is_finished(&self) -> bool {
        self.current_time >= self.node.duration
    }
}

impl NodeEvaluator for SimpleBlendEvaluator {
    fn on_run(
        &mut self,
        _tree: &mut EvaluatorStorage,
        params: &EvaluationParams,
        _out: &mut EvaluationResult,
    ) {
        let duration = self.node.duration;
        if duration <= 0.0 {
            self.current_time = 0.0;
            self.blend_factor = 1.0;
            return;
        }
        self.current_time = (self.current_time + params.delta_time.max(0.0)).min(duration);
        let t = f64::from(self.current_time) / f64::from(duration);
        self.blend_factor = self.node.ease.apply(t);
    }

    fn on_serialize(&mut self, archive: &mut StateArchive) -> CameraResult<()> {
        archive.serialize(&mut self.current_time)?;
        archive.serialize(&mut self.blend_factor)
    }

    fn on_build_debug_blocks(&self, builder: &mut DebugBlockBuilder) {
        builder.add_text(format!(
            "{:.0}% ({:.2}s / {:.2}s, {:?})",
            self.blend_factor * 100.0,
            self.current_time,
            self.node.duration,
            self.node.ease
        ));
    }

    fn as_blend_mut(&mut self) -> Option<&mut dyn BlendEvaluator> {
        Some(self)
    }
}

impl BlendEvaluator for SimpleBlendEvaluator {
    fn blend_parameters(&mut self, params: &PreBlendParams<'_>, out: &mut PreBlendResult<'_>) {
        out.variable_table.lerp(
            params.child_variable_table,
            VariableTableFilter::INPUT,
            self.blend_factor,
        );
    }

    fn blend_results(&mut self, params: &BlendParams<'_>, out: &mut BlendResult<'_>) {
        out.blended_result
            .lerp_all(params.child_result, self.blend_factor);
        out.is_blend_full = self.blend_factor >= 1.0;
        out.is_blend_finished = self.is_finished();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/simple.rs"]
mod tests;
