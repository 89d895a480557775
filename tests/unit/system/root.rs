use super::*;
use crate::eval::result::EvaluationResult;
use crate::foundation::core::DVec3;
use crate::node::evaluator::EvaluationParams;
use crate::nodes::OffsetCameraNode;

fn offset_rig(name: &str, offset: DVec3) -> Arc<CameraRigAsset> {
    CameraRigAsset::builder(name)
        .root_node(Arc::new(OffsetCameraNode::new(offset)))
        .build()
}

fn build_root() -> (EvaluatorStorage, EvaluatorId) {
    let node: Arc<dyn CameraNode> =
        Arc::new(DefaultRootCameraNode::new(&CameraSystemSettings::default()));
    let mut storage = EvaluatorStorage::new();
    let root = storage.build_tree(&node).unwrap();
    (storage, root)
}

fn activate(
    storage: &mut EvaluatorStorage,
    root: EvaluatorId,
    rig: &Arc<CameraRigAsset>,
    context: &Rc<EvaluationContext>,
    layer: CameraRigLayer,
) -> PushOutcome {
    let params = ActivateCameraRigParams {
        camera_rig: Arc::clone(rig),
        evaluation_context: Rc::clone(context),
        layer,
    };
    storage
        .with_evaluator::<DefaultRootEvaluator, _>(root, |r, tree| {
            r.activate_camera_rig(tree, &params)
        })
        .unwrap()
        .unwrap()
}

fn run(storage: &mut EvaluatorStorage, root: EvaluatorId, context: &Rc<EvaluationContext>) -> EvaluationResult {
    let mut out = EvaluationResult::default();
    let params = EvaluationParams {
        evaluation_context: Some(Rc::clone(context)),
        delta_time: 0.1,
        ..Default::default()
    };
    storage.run(root, &params, &mut out);
    out
}

fn take_events(storage: &mut EvaluatorStorage, root: EvaluatorId) -> Vec<RootCameraRigEvent> {
    storage
        .get_mut::<DefaultRootEvaluator>(root)
        .unwrap()
        .take_events()
}

#[test]
fn builds_one_stack_per_layer() {
    let (storage, root) = build_root();
    assert_eq!(storage.len(), 5);
    let names: Vec<&str> = (0..5)
        .map(|i| storage.node(EvaluatorId(i)).unwrap().name())
        .collect();
    assert_eq!(names, ["root", "base", "main", "global", "visual"]);

    let eval = storage.get::<DefaultRootEvaluator>(root).unwrap();
    let main = eval.layer_evaluator(CameraRigLayer::Main).unwrap();
    let stack = storage.get::<BlendStackEvaluator>(main).unwrap();
    assert!(stack.is_empty());
}

#[test]
fn activation_targets_the_requested_layer() {
    let (mut storage, root) = build_root();
    let context = EvaluationContext::new("player");
    let rig = offset_rig("orbit", DVec3::X);

    assert_eq!(
        activate(&mut storage, root, &rig, &context, CameraRigLayer::Global),
        PushOutcome::Pushed
    );
    assert_eq!(
        activate(&mut storage, root, &rig, &context, CameraRigLayer::Global),
        PushOutcome::AlreadyActive
    );

    let events = take_events(&mut storage, root);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, RootCameraRigEventType::Activated);
    assert_eq!(events[0].layer, CameraRigLayer::Global);
    assert_eq!(events[0].camera_rig_info.camera_rig_name(), Some("orbit"));
    assert!(take_events(&mut storage, root).is_empty());

    let eval = storage.get::<DefaultRootEvaluator>(root).unwrap();
    let global = eval.layer_evaluator(CameraRigLayer::Global).unwrap();
    let main = eval.layer_evaluator(CameraRigLayer::Main).unwrap();
    assert_eq!(storage.get::<BlendStackEvaluator>(global).unwrap().len(), 1);
    assert!(storage.get::<BlendStackEvaluator>(main).unwrap().is_empty());
}

#[test]
fn higher_layers_are_evaluated_last() {
    let (mut storage, root) = build_root();
    let context = EvaluationContext::new("player");
    activate(&mut storage, root, &offset_rig("visual", DVec3::new(0.0, 0.0, 5.0)), &context, CameraRigLayer::Visual);
    activate(&mut storage, root, &offset_rig("base", DVec3::new(1.0, 0.0, 0.0)), &context, CameraRigLayer::Base);

    // Each layer starts from what the layers below produced.
    let out = run(&mut storage, root, &context);
    assert_eq!(out.camera_pose.location(), DVec3::new(1.0, 0.0, 5.0));
}

#[test]
fn main_layer_pops_covered_rigs() {
    let (mut storage, root) = build_root();
    let context = EvaluationContext::new("player");
    let first = offset_rig("first", DVec3::X);
    let second = offset_rig("second", DVec3::Y);

    activate(&mut storage, root, &first, &context, CameraRigLayer::Main);
    run(&mut storage, root, &context);
    activate(&mut storage, root, &second, &context, CameraRigLayer::Main);
    let out = run(&mut storage, root, &context);
    assert_eq!(out.camera_pose.location(), DVec3::new(1.0, 1.0, 0.0));

    let kinds: Vec<(RootCameraRigEventType, Option<String>)> = take_events(&mut storage, root)
        .into_iter()
        .map(|e| (e.event_type, e.camera_rig_info.camera_rig_name().map(str::to_owned)))
        .collect();
    assert_eq!(
        kinds,
        [
            (RootCameraRigEventType::Activated, Some("first".to_owned())),
            (RootCameraRigEventType::Activated, Some("second".to_owned())),
            (RootCameraRigEventType::Deactivated, Some("first".to_owned())),
        ]
    );
}

#[test]
fn base_layer_keeps_covered_rigs() {
    let (mut storage, root) = build_root();
    let context = EvaluationContext::new("player");
    activate(&mut storage, root, &offset_rig("a", DVec3::X), &context, CameraRigLayer::Base);
    run(&mut storage, root, &context);
    activate(&mut storage, root, &offset_rig("b", DVec3::Y), &context, CameraRigLayer::Base);
    run(&mut storage, root, &context);

    let eval = storage.get::<DefaultRootEvaluator>(root).unwrap();
    let base = eval.layer_evaluator(CameraRigLayer::Base).unwrap();
    assert_eq!(
        storage.get::<BlendStackEvaluator>(base).unwrap().camera_rig_names(),
        ["a", "b"]
    );
}

#[test]
fn layer_names_display() {
    assert_eq!(CameraRigLayer::Visual.to_string(), "visual");
    assert_eq!(CameraRigLayer::default(), CameraRigLayer::Main);
}
