use super::*;
use crate::eval::director::{SingleCameraDirector, SwitchableCameraDirector};
use crate::foundation::core::DVec3;
use crate::system::root::CameraRigLayer;

fn rig(name: &str) -> Arc<CameraRigAsset> {
    CameraRigAsset::builder(name).build()
}

#[test]
fn new_context_has_a_valid_initial_result() {
    let context = EvaluationContext::new("player");
    assert_eq!(context.name(), "player");
    assert!(context.initial_result().is_valid);
    assert!(context.camera_asset().is_none());
    assert!(!context.has_director());
}

#[test]
fn initial_pose_is_flagged_as_changed() {
    let mut pose = CameraPose::default();
    pose.set_location(DVec3::new(1.0, 2.0, 3.0));
    let context = EvaluationContext::builder("player")
        .initial_pose(pose)
        .camera_asset(Arc::new(CameraAsset::new("player_camera")))
        .build();
    let result = context.initial_result();
    assert!(result.camera_pose.changed_flags().location);
    assert!(!result.camera_pose.changed_flags().rotation);
    assert_eq!(
        context.camera_asset().map(|a| a.name()),
        Some("player_camera")
    );
}

#[test]
fn initial_result_can_be_invalidated_from_outside() {
    let context = EvaluationContext::new("player");
    context.initial_result_mut().is_valid = false;
    assert!(!context.initial_result().is_valid);
}

#[test]
fn director_reports_its_rig() {
    let context = EvaluationContext::builder("player")
        .director(Box::new(SingleCameraDirector::new(rig("follow"))))
        .build();
    let out = context.run_director(&DirectorEvaluationParams::default());
    assert_eq!(out.active_camera_rigs.len(), 1);
    let active = &out.active_camera_rigs[0];
    assert_eq!(active.camera_rig.name(), "follow");
    assert_eq!(active.layer, CameraRigLayer::Main);
    assert!(Rc::ptr_eq(&active.evaluation_context, &context));
}

#[test]
fn switchable_director_follows_its_handle() {
    let director = SwitchableCameraDirector::new();
    let handle = director.handle();
    let context = EvaluationContext::new("player");
    context.set_director(Box::new(director));
    assert!(context.run_director(&DirectorEvaluationParams::default()).is_empty());

    handle.set_camera_rig(Some(rig("aim")));
    let out = context.run_director(&DirectorEvaluationParams::default());
    assert_eq!(out.active_camera_rigs[0].camera_rig.name(), "aim");

    handle.set_camera_rig(None);
    assert!(context.run_director(&DirectorEvaluationParams::default()).is_empty());
}

#[test]
fn context_stack_moves_repushed_contexts_to_the_top() {
    let a = EvaluationContext::new("a");
    let b = EvaluationContext::new("b");
    let mut stack = ContextStack::default();
    stack.push_context(&a);
    stack.push_context(&b);
    stack.push_context(&a);
    assert_eq!(stack.len(), 2);
    assert_eq!(stack.active_context().unwrap().name(), "a");

    assert!(stack.remove_context(&a));
    assert!(!stack.remove_context(&a));
    assert_eq!(stack.active_context().unwrap().name(), "b");
}

#[test]
fn context_stack_prunes_dropped_contexts() {
    let a = EvaluationContext::new("a");
    let mut stack = ContextStack::default();
    stack.push_context(&a);
    {
        let b = EvaluationContext::new("b");
        stack.push_context(&b);
    }
    assert_eq!(stack.len(), 2);
    assert_eq!(stack.active_context().unwrap().name(), "a");
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.pop_context().unwrap().name(), "a");
    assert!(stack.is_empty());
    assert!(stack.pop_context().is_none());
}
