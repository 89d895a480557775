use super::*;
use crate::foundation::core::DVec3;
use crate::variables::VariableDefinition;

#[test]
fn reset_keeps_variables_registered() {
    let def = VariableDefinition::of::<f32>("fov");
    let mut result = EvaluationResult::default();
    result.variable_table.add_variable(&def).unwrap();
    result.variable_table.set_value(def.id, 1.0_f32).unwrap();
    result.camera_pose.set_location(DVec3::ONE);
    result.is_camera_cut = true;
    result.is_valid = true;

    result.reset(false);
    assert!(result.variable_table.is_value_written(def.id));
    assert_eq!(result.camera_pose.location(), DVec3::ZERO);
    assert!(!result.is_camera_cut);
    assert!(!result.is_valid);

    result.reset(true);
    assert!(result.variable_table.contains_value(def.id));
    assert!(!result.variable_table.is_value_written(def.id));
}

#[test]
fn joints_blend_by_id() {
    let id = VariableId::from_name("pivot");
    let mut a = CameraRigJoints::default();
    a.add_joint(id, Transform3::IDENTITY);
    let mut b = CameraRigJoints::default();
    let mut moved = Transform3::IDENTITY;
    moved.translation = DVec3::new(4.0, 0.0, 0.0);
    b.add_joint(id, moved);
    b.add_joint(VariableId::from_name("other"), Transform3::IDENTITY);

    a.lerp_all(&b, 0.25);
    assert_eq!(a.joints().len(), 2);
    assert!((a.joints()[0].transform.translation.x - 1.0).abs() < 1e-12);
}

#[test]
fn override_accumulates_camera_cut() {
    let mut acc = EvaluationResult::default();
    let mut src = EvaluationResult {
        is_camera_cut: true,
        ..Default::default()
    };
    src.camera_pose.set_field_of_view(45.0);
    acc.override_all(&src);
    assert!(acc.is_camera_cut);
    assert_eq!(acc.camera_pose.field_of_view(), 45.0);
}

#[test]
fn serialize_restores_snapshot() {
    let mut result = EvaluationResult::default();
    result.camera_pose.set_location(DVec3::new(1.0, 2.0, 3.0));
    result.is_valid = true;

    let mut ar = StateArchive::saving();
    result.serialize(&mut ar).unwrap();

    let mut restored = EvaluationResult::default();
    let mut ar = ar.into_loading();
    restored.serialize(&mut ar).unwrap();
    assert_eq!(restored.camera_pose, result.camera_pose);
    assert!(restored.is_valid);
}
