use std::sync::Arc;

use crate::node::evaluator::{CameraNode, EvaluatorChildren, EvaluatorFlags, NodeEvaluator};
use crate::node::storage::EvaluatorBuilder;

/// Runs its children in order. Does nothing by itself.
#[derive(Debug)]
pub struct ArrayCameraNode {
    pub name: String,
    pub children: Vec<Arc<dyn CameraNode>>,
}

impl ArrayCameraNode {
    pub fn new(name: impl Into<String>, children: Vec<Arc<dyn CameraNode>>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

impl CameraNode for ArrayCameraNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn children(&self) -> Vec<Arc<dyn CameraNode>> {
        self.children.clone()
    }

    fn build_evaluator(self: Arc<Self>) -> Box<dyn NodeEvaluator> {
        Box::new(ArrayEvaluator {
            node: self,
            children: EvaluatorChildren::new(),
        })
    }
}

#[derive(Debug)]
pub struct ArrayEvaluator {
    node: Arc<ArrayCameraNode>,
    children: EvaluatorChildren,
}

impl NodeEvaluator for ArrayEvaluator {
    fn flags(&self) -> EvaluatorFlags {
        EvaluatorFlags::empty()
    }

    fn children(&self) -> EvaluatorChildren {
        self.children.clone()
    }

    fn on_build(&mut self, builder: &mut EvaluatorBuilder<'_>) {
        for child in &self.node.children {
            let id = builder.build_evaluator(child);
            self.children.push(id);
        }
    }
}
