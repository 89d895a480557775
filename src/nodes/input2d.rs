use std::sync::Arc;

use crate::eval::result::EvaluationResult;
use crate::foundation::archive::StateArchive;
use crate::foundation::core::{DQuat, Vec2};
use crate::foundation::error::CameraResult;
use crate::node::debug::DebugBlockBuilder;
use crate::node::evaluator::{
    CameraNode, CameraOperation, EvaluationParams, EvaluatorFlags, NodeEvaluator,
    OperationParams, ParameterUpdateParams, ParameterUpdateResult,
};
use crate::node::storage::EvaluatorStorage;
use crate::variables::{VariableDefinition, VariableTableAllocationInfo};

/// Yaw/pitch input, in degrees, published as a blendable `Vector2d` variable.
///
/// `x` is yaw and `y` is pitch. Rigs sharing the variable name blend their inputs before
/// running, so the orientation eases between rigs instead of snapping.
#[derive(Clone, Debug)]
pub struct Input2DCameraNode {
    pub variable: VariableDefinition,
    pub min_pitch: f64,
    pub max_pitch: f64,
    pub initial: Vec2,
}

impl Input2DCameraNode {
    pub fn new(variable_name: &str) -> Self {
        Self {
            variable: VariableDefinition::of::<Vec2>(variable_name).input(),
            min_pitch: -89.0,
            max_pitch: 89.0,
            initial: Vec2::ZERO,
        }
    }

    pub fn with_pitch_limits(mut self, min_pitch: f64, max_pitch: f64) -> Self {
        self.min_pitch = min_pitch.min(max_pitch);
        self.max_pitch = max_pitch.max(min_pitch);
        self
    }

    pub fn with_initial(mut self, yaw: f64, pitch: f64) -> Self {
        self.initial = Vec2::new(yaw, pitch);
        self
    }

    fn clamp(&self, value: Vec2) -> Vec2 {
        Vec2::new(value.x, value.y.clamp(self.min_pitch, self.max_pitch))
    }
}

impl CameraNode for Input2DCameraNode {
    fn name(&self) -> &str {
        "input_2d"
    }

    fn declare_variables(&self, info: &mut VariableTableAllocationInfo) {
        info.add(self.variable.clone());
    }

    fn build_evaluator(self: Arc<Self>) -> Box<dyn NodeEvaluator> {
        let value = self.clamp(self.initial);
        Box::new(Input2DEvaluator { node: self, value })
    }
}

#[derive(Debug)]
pub struct Input2DEvaluator {
    node: Arc<Input2DCameraNode>,
    value: Vec2,
}

impl Input2DEvaluator {
    /// This rig's own yaw/pitch, before any pre-blending.
    pub fn value(&self) -> Vec2 {
        self.value
    }
}

/// Rotation for a yaw/pitch pair in degrees: yaw turns about up, positive pitch looks up.
pub fn yaw_pitch_rotation(value: Vec2) -> DQuat {
    DQuat::from_rotation_z(value.x.to_radians()) * DQuat::from_rotation_y(-value.y.to_radians())
}

impl NodeEvaluator for Input2DEvaluator {
    fn flags(&self) -> EvaluatorFlags {
        EvaluatorFlags::NEEDS_PARAMETER_UPDATE
            | EvaluatorFlags::NEEDS_EVALUATION_UPDATE
            | EvaluatorFlags::SUPPORTS_OPERATIONS
    }

    fn on_update_parameters(
        &mut self,
        _tree: &mut EvaluatorStorage,
        _params: &ParameterUpdateParams<'_>,
        out: &mut ParameterUpdateResult<'_>,
    ) {
        out.variable_table
            .try_set_value(self.node.variable.id, self.value);
    }

    fn on_run(
        &mut self,
        _tree: &mut EvaluatorStorage,
        _params: &EvaluationParams,
        out: &mut EvaluationResult,
    ) {
        let value = out
            .variable_table
            .find_value::<Vec2>(self.node.variable.id)
            .unwrap_or(self.value);
        let pose = &mut out.camera_pose;
        let rotation = pose.rotation() * yaw_pitch_rotation(value);
        pose.set_rotation(rotation);
    }

    fn on_execute_operation(
        &mut self,
        _tree: &mut EvaluatorStorage,
        _params: &OperationParams,
        operation: &mut CameraOperation,
    ) {
        let next = match *operation {
            CameraOperation::YawPitch { yaw, pitch } => {
                Vec2::new(self.value.x + yaw, self.value.y + pitch)
            }
            CameraOperation::SetYawPitch { yaw, pitch } => Vec2::new(
                yaw.unwrap_or(self.value.x),
                pitch.unwrap_or(self.value.y),
            ),
        };
        self.value = self.node.clamp(next);
    }

    fn on_serialize(&mut self, archive: &mut StateArchive) -> CameraResult<()> {
        archive.serialize(&mut self.value)
    }

    fn on_build_debug_blocks(&self, builder: &mut DebugBlockBuilder) {
        builder.add_text(format!(
            "{}: yaw {:.1} pitch {:.1}",
            self.node.variable.name, self.value.x, self.value.y
        ));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/nodes/input2d.rs"]
mod tests;
