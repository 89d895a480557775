use super::*;
use crate::asset::transition::{
    FrozenSourceCondition, NextRigCondition, PreviousRigCondition, TransitionCondition,
    TransitionConditionMatchParams,
};
use crate::blend::PopBlendCameraNode;
use crate::foundation::core::DVec3;
use crate::nodes::{ArrayCameraNode, FieldOfViewCameraNode, Input2DCameraNode, OffsetCameraNode};

fn orbit_rig() -> Arc<CameraRigAsset> {
    let root: Arc<dyn CameraNode> = Arc::new(ArrayCameraNode::new(
        "orbit",
        vec![
            Arc::new(Input2DCameraNode::new("look")),
            Arc::new(OffsetCameraNode::new(DVec3::new(-300.0, 0.0, 50.0))),
            Arc::new(FieldOfViewCameraNode::new(70.0).with_variable("zoom")),
        ],
    ));
    CameraRigAsset::builder("orbit")
        .root_node(root)
        .depends_on(PackageId::new("shared"))
        .depends_on(PackageId::new("shared"))
        .build()
}

#[test]
fn allocation_info_covers_the_whole_tree() {
    let rig = orbit_rig();
    let info = rig.allocation_info();
    assert_eq!(info.evaluator_info.evaluator_count, 4);
    let names: Vec<&str> = info
        .variable_table_info
        .definitions
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(names, ["look", "zoom"]);
}

#[test]
fn interface_parameters_are_the_inputs() {
    let rig = orbit_rig();
    assert_eq!(rig.interface_parameters().len(), 2);
    assert!(rig.interface_parameters().iter().all(|d| d.is_input));
}

#[test]
fn packages_start_with_the_rig_package() {
    let rig = orbit_rig();
    assert_eq!(
        rig.packages(),
        [PackageId::new("orbit"), PackageId::new("shared")]
    );
    assert!(rig.depends_on(&PackageId::new("shared")));
    assert!(!rig.depends_on(&PackageId::new("other")));
}

#[test]
fn rig_without_root_has_empty_allocation() {
    let rig = CameraRigAsset::builder("empty").build();
    assert!(rig.root_node().is_none());
    assert_eq!(rig.allocation_info(), &CameraRigAllocationInfo::default());
}

#[test]
fn transitions_keep_declaration_order_and_conditions() {
    let rig = CameraRigAsset::builder("b")
        .root_node(Arc::new(OffsetCameraNode::new(DVec3::ZERO)))
        .enter_transition(
            CameraRigTransition::new(PopBlendCameraNode::shared())
                .with_condition(PreviousRigCondition::new("a")),
        )
        .enter_transition(CameraRigTransition::without_blend())
        .exit_transition(
            CameraRigTransition::without_blend().with_condition(FrozenSourceCondition { frozen: true }),
        )
        .build();
    assert_eq!(rig.enter_transitions().len(), 2);
    assert!(rig.enter_transitions()[0].blend().is_some());
    assert!(rig.enter_transitions()[1].blend().is_none());

    let a = CameraRigAsset::builder("a").build();
    let mut params = TransitionConditionMatchParams {
        from_camera_rig: Some(&a),
        from_camera_asset: None,
        to_camera_rig: &rig,
        to_camera_asset: None,
        from_frozen: false,
    };
    assert!(rig.enter_transitions()[0].conditions_match(&params));
    assert!(!rig.exit_transitions()[0].conditions_match(&params));
    params.from_frozen = true;
    assert!(rig.exit_transitions()[0].conditions_match(&params));
    params.from_camera_rig = None;
    assert!(!rig.enter_transitions()[0].conditions_match(&params));
    assert!(NextRigCondition::new("b").matches(&params));
}
