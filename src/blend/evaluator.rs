use crate::eval::pose::CameraPose;
use crate::eval::result::EvaluationResult;
use crate::node::evaluator::EvaluationParams;
use crate::variables::VariableTable;

pub struct PreBlendParams<'a> {
    pub evaluation: &'a EvaluationParams,
    pub last_camera_pose: &'a CameraPose,
    /// Variables of the entry being blended in.
    pub child_variable_table: &'a VariableTable,
}

pub struct PreBlendResult<'a> {
    /// The blend stack's shared variables.
    pub variable_table: &'a mut VariableTable,
}

pub struct BlendParams<'a> {
    pub evaluation: &'a EvaluationParams,
    pub child_result: &'a EvaluationResult,
}

pub struct BlendResult<'a> {
    pub blended_result: &'a mut EvaluationResult,
    /// The child now fully covers what was below it.
    pub is_blend_full: bool,
    /// The blend will not change anymore.
    pub is_blend_finished: bool,
}

impl<'a> BlendResult<'a> {
    pub fn new(blended_result: &'a mut EvaluationResult) -> Self {
        Self {
            blended_result,
            is_blend_full: false,
            is_blend_finished: false,
        }
    }
}

/// Evaluator for a transition's blend node.
///
/// The blend stack drives it in two steps per frame: input variables are blended before the
/// rigs run, results after. Blend progress itself advances in `on_run`, which sees last
/// frame's pose only.
pub trait BlendEvaluator {
    fn blend_parameters(&mut self, params: &PreBlendParams<'_>, out: &mut PreBlendResult<'_>);

    fn blend_results(&mut self, params: &BlendParams<'_>, out: &mut BlendResult<'_>);
}
