use std::cell::RefCell;
use std::rc::Rc;

use super::*;

type Log = Rc<RefCell<Vec<&'static str>>>;

#[derive(Debug)]
struct Recorder {
    label: &'static str,
    log: Log,
}

impl CameraNode for Recorder {
    fn name(&self) -> &str {
        self.label
    }

    fn build_evaluator(self: Arc<Self>) -> Box<dyn NodeEvaluator> {
        Box::new(RecorderEvaluator { node: self })
    }
}

#[derive(Debug)]
struct RecorderEvaluator {
    node: Arc<Recorder>,
}

impl NodeEvaluator for RecorderEvaluator {
    fn on_run(
        &mut self,
        _tree: &mut EvaluatorStorage,
        _params: &EvaluationParams,
        _out: &mut EvaluationResult,
    ) {
        self.node.log.borrow_mut().push(self.node.label);
    }
}

fn recorder(label: &'static str, log: &Log) -> Arc<dyn CameraNode> {
    Arc::new(Recorder {
        label,
        log: Rc::clone(log),
    })
}

#[test]
fn builds_blend_before_rig_root() {
    let log = Log::default();
    let node: Arc<dyn CameraNode> = Arc::new(BlendStackRootCameraNode::new(
        recorder("blend", &log),
        Some(recorder("rig", &log)),
    ));
    let mut storage = EvaluatorStorage::new();
    let root = storage.build_tree(&node).unwrap();
    let wrapper = storage.get::<BlendStackRootEvaluator>(root).unwrap();
    assert_eq!(wrapper.blend_evaluator(), Some(EvaluatorId(1)));
    assert_eq!(wrapper.rig_root_evaluator(), Some(EvaluatorId(2)));
    assert_eq!(storage.node(EvaluatorId(2)).unwrap().name(), "rig");
}

#[test]
fn run_goes_blend_then_rig() {
    let log = Log::default();
    let node: Arc<dyn CameraNode> = Arc::new(BlendStackRootCameraNode::new(
        recorder("blend", &log),
        Some(recorder("rig", &log)),
    ));
    let mut storage = EvaluatorStorage::new();
    let root = storage.build_tree(&node).unwrap();
    storage.run(root, &EvaluationParams::default(), &mut EvaluationResult::default());
    assert_eq!(*log.borrow(), ["blend", "rig"]);
}

#[test]
fn missing_rig_root_leaves_only_the_blend() {
    let log = Log::default();
    let node: Arc<dyn CameraNode> =
        Arc::new(BlendStackRootCameraNode::new(recorder("blend", &log), None));
    let mut storage = EvaluatorStorage::new();
    let root = storage.build_tree(&node).unwrap();
    let wrapper = storage.get::<BlendStackRootEvaluator>(root).unwrap();
    assert!(wrapper.rig_root_evaluator().is_none());
    assert_eq!(wrapper.children().len(), 1);
    assert_eq!(node.children().len(), 1);
}
