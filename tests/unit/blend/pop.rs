use super::*;
use crate::eval::result::EvaluationResult;
use crate::foundation::core::DVec3;
use crate::node::evaluator::EvaluationParams;
use crate::node::storage::EvaluatorStorage;
use crate::eval::pose::CameraPose;
use crate::variables::{VariableDefinition, VariableTable};

#[test]
fn cut_overrides_inputs_only() {
    let input = VariableDefinition::of::<f32>("yaw").input();
    let output = VariableDefinition::of::<f32>("dist");
    let mut child = VariableTable::new();
    child.add_variable(&input).unwrap();
    child.add_variable(&output).unwrap();
    child.set_value(input.id, 45.0_f32).unwrap();
    child.set_value(output.id, 3.0_f32).unwrap();

    let mut shared = VariableTable::new();
    let evaluation = EvaluationParams::default();
    let pose = CameraPose::default();
    let mut blend = PopBlendEvaluator;
    blend.blend_parameters(
        &PreBlendParams {
            evaluation: &evaluation,
            last_camera_pose: &pose,
            child_variable_table: &child,
        },
        &mut PreBlendResult {
            variable_table: &mut shared,
        },
    );
    assert_eq!(shared.get_value::<f32>(input.id).unwrap(), 45.0);
    assert!(!shared.contains_value(output.id));
}

#[test]
fn cut_is_full_and_finished_on_first_frame() {
    let mut storage = EvaluatorStorage::new();
    let id = storage.build_tree(&PopBlendCameraNode::shared()).unwrap();
    assert_eq!(storage.flags(id), Some(EvaluatorFlags::empty()));

    let mut child = EvaluationResult::default();
    child.camera_pose.set_location(DVec3::new(5.0, 0.0, 1.0));
    let mut blended = EvaluationResult::default();
    blended.camera_pose.set_location(DVec3::new(-1.0, -1.0, -1.0));

    let evaluation = EvaluationParams::default();
    let mut out = BlendResult::new(&mut blended);
    storage.blend_mut(id).unwrap().blend_results(
        &BlendParams {
            evaluation: &evaluation,
            child_result: &child,
        },
        &mut out,
    );
    assert!(out.is_blend_full);
    assert!(out.is_blend_finished);
    assert_eq!(blended.camera_pose.location(), DVec3::new(5.0, 0.0, 1.0));
}

#[test]
fn cut_flags_a_camera_cut_on_its_first_frame() {
    let child = EvaluationResult::default();
    let mut blended = EvaluationResult::default();
    let evaluation = EvaluationParams {
        is_first_frame: true,
        ..Default::default()
    };
    let mut out = BlendResult::new(&mut blended);
    PopBlendEvaluator.blend_results(
        &BlendParams {
            evaluation: &evaluation,
            child_result: &child,
        },
        &mut out,
    );
    assert!(blended.is_camera_cut);
}
