use std::sync::Arc;

use crate::eval::result::EvaluationResult;
use crate::node::evaluator::{CameraNode, EvaluationParams, NodeEvaluator};
use crate::node::storage::EvaluatorStorage;
use crate::variables::{VariableDefinition, VariableTableAllocationInfo};

/// Sets the horizontal field of view, optionally driven by a float variable.
#[derive(Clone, Debug)]
pub struct FieldOfViewCameraNode {
    /// Degrees, used while the variable is unwritten.
    pub field_of_view: f32,
    pub variable: Option<VariableDefinition>,
}

impl FieldOfViewCameraNode {
    pub fn new(field_of_view: f32) -> Self {
        Self {
            field_of_view,
            variable: None,
        }
    }

    /// Drive the field of view from the blendable input variable `name`.
    pub fn with_variable(mut self, name: &str) -> Self {
        self.variable = Some(VariableDefinition::of::<f32>(name).input());
        self
    }
}

impl CameraNode for FieldOfViewCameraNode {
    fn name(&self) -> &str {
        "field_of_view"
    }

    fn declare_variables(&self, info: &mut VariableTableAllocationInfo) {
        if let Some(variable) = &self.variable {
            info.add(variable.clone());
        }
    }

    fn build_evaluator(self: Arc<Self>) -> Box<dyn NodeEvaluator> {
        Box::new(FieldOfViewEvaluator { node: self })
    }
}

#[derive(Debug)]
pub struct FieldOfViewEvaluator {
    node: Arc<FieldOfViewCameraNode>,
}

impl NodeEvaluator for FieldOfViewEvaluator {
    fn on_run(
        &mut self,
        _tree: &mut EvaluatorStorage,
        _params: &EvaluationParams,
        out: &mut EvaluationResult,
    ) {
        let fov = self
            .node
            .variable
            .as_ref()
            .and_then(|v| out.variable_table.find_value::<f32>(v.id))
            .unwrap_or(self.node.field_of_view);
        out.camera_pose.set_field_of_view(fov);
        // A focal length would win over the field of view.
        out.camera_pose.set_focal_length(-1.0);
    }
}
