use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::blend::evaluator::BlendEvaluator;
use crate::eval::result::EvaluationResult;
use crate::foundation::archive::StateArchive;
use crate::foundation::error::{CameraError, CameraResult};
use crate::node::debug::{DebugBlockBuilder, ReferenceCollector};
use crate::node::evaluator::{
    CameraNode, CameraOperation, EvaluationParams, EvaluatorFlags, EvaluatorId,
    InitializeParams, NodeEvaluator, OperationParams, ParameterUpdateParams,
    ParameterUpdateResult,
};

/// Size hint for an evaluator tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EvaluatorAllocationInfo {
    pub evaluator_count: usize,
}

struct Slot {
    node: Arc<dyn CameraNode>,
    // `None` while the evaluator is out of its slot running a hook.
    evaluator: Option<Box<dyn NodeEvaluator>>,
}

/// Arena owning every evaluator of one tree.
///
/// Evaluators refer to each other by [`EvaluatorId`] only. Dispatch takes an evaluator out of
/// its slot for the duration of its hook, which lets the hook drive its own children through
/// the same storage.
///
/// Generic walkers follow the capability flags:
/// - `initialize`, `collect_references`, `serialize`, `build_debug_blocks` visit the node
///   then every child;
/// - `update_parameters` and `run` call the node's own hook when it has the matching flag,
///   and forward to the children otherwise;
/// - `execute_operation` drops disabled subtrees, then behaves like `run` with
///   [`EvaluatorFlags::SUPPORTS_OPERATIONS`].
#[derive(Default)]
pub struct EvaluatorStorage {
    slots: Vec<Slot>,
    root: Option<EvaluatorId>,
}

impl fmt::Debug for EvaluatorStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluatorStorage")
            .field("evaluators", &self.slots.len())
            .field("root", &self.root)
            .finish()
    }
}

impl EvaluatorStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allocation_info(info: &EvaluatorAllocationInfo) -> Self {
        Self {
            slots: Vec::with_capacity(info.evaluator_count),
            root: None,
        }
    }

    pub fn is_built(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<EvaluatorId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Instantiate the evaluator tree for `root_node`.
    ///
    /// A storage holds one build; building again without [`EvaluatorStorage::destroy_tree`]
    /// is an error.
    pub fn build_tree(&mut self, root_node: &Arc<dyn CameraNode>) -> CameraResult<EvaluatorId> {
        if !self.slots.is_empty() {
            tracing::error!(node = root_node.name(), "evaluator storage is already built");
            return Err(CameraError::config(format!(
                "cannot build '{}': storage already holds a tree",
                root_node.name()
            )));
        }
        let root = EvaluatorBuilder { storage: self }.build_evaluator(root_node);
        self.root = Some(root);
        Ok(root)
    }

    /// Tear down every evaluator and release the arena.
    pub fn destroy_tree(&mut self) {
        self.slots = Vec::new();
        self.root = None;
    }

    pub fn node(&self, id: EvaluatorId) -> Option<&Arc<dyn CameraNode>> {
        self.slots.get(id.index()).map(|s| &s.node)
    }

    pub fn flags(&self, id: EvaluatorId) -> Option<EvaluatorFlags> {
        self.evaluator(id).map(|e| e.flags())
    }

    pub fn evaluator(&self, id: EvaluatorId) -> Option<&dyn NodeEvaluator> {
        self.slots.get(id.index())?.evaluator.as_deref()
    }

    pub fn get<T: NodeEvaluator>(&self, id: EvaluatorId) -> Option<&T> {
        let evaluator: &dyn Any = self.evaluator(id)?;
        evaluator.downcast_ref::<T>()
    }

    pub fn get_mut<T: NodeEvaluator>(&mut self, id: EvaluatorId) -> Option<&mut T> {
        let evaluator: &mut dyn Any = self.slots.get_mut(id.index())?.evaluator.as_deref_mut()?;
        evaluator.downcast_mut::<T>()
    }

    pub fn blend_mut(&mut self, id: EvaluatorId) -> Option<&mut dyn BlendEvaluator> {
        self.slots
            .get_mut(id.index())?
            .evaluator
            .as_deref_mut()?
            .as_blend_mut()
    }

    /// Call `f` with the evaluator `id` as `T`, lending it the rest of the tree.
    pub fn with_evaluator<T, R>(
        &mut self,
        id: EvaluatorId,
        f: impl FnOnce(&mut T, &mut EvaluatorStorage) -> R,
    ) -> Option<R>
    where
        T: NodeEvaluator,
    {
        let mut evaluator = self.take(id)?;
        let result = match (&mut *evaluator as &mut dyn Any).downcast_mut::<T>() {
            Some(typed) => Some(f(typed, self)),
            None => None,
        };
        self.restore(id, evaluator);
        result
    }

    fn take(&mut self, id: EvaluatorId) -> Option<Box<dyn NodeEvaluator>> {
        let evaluator = self.slots.get_mut(id.index())?.evaluator.take();
        if evaluator.is_none() {
            tracing::trace!(?id, "evaluator is busy or missing, skipping dispatch");
        }
        evaluator
    }

    fn restore(&mut self, id: EvaluatorId, evaluator: Box<dyn NodeEvaluator>) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            slot.evaluator = Some(evaluator);
        }
    }

    pub fn initialize(
        &mut self,
        id: EvaluatorId,
        params: &InitializeParams<'_>,
        out: &mut EvaluationResult,
    ) {
        let Some(mut evaluator) = self.take(id) else {
            return;
        };
        evaluator.on_initialize(params, out);
        let children = evaluator.children();
        self.restore(id, evaluator);
        for child in children {
            self.initialize(child, params, out);
        }
    }

    pub fn update_parameters(
        &mut self,
        id: EvaluatorId,
        params: &ParameterUpdateParams<'_>,
        out: &mut ParameterUpdateResult<'_>,
    ) {
        let Some(mut evaluator) = self.take(id) else {
            return;
        };
        if evaluator
            .flags()
            .contains(EvaluatorFlags::NEEDS_PARAMETER_UPDATE)
        {
            evaluator.on_update_parameters(self, params, out);
            self.restore(id, evaluator);
        } else {
            let children = evaluator.children();
            self.restore(id, evaluator);
            for child in children {
                self.update_parameters(child, params, out);
            }
        }
    }

    pub fn run(&mut self, id: EvaluatorId, params: &EvaluationParams, out: &mut EvaluationResult) {
        let Some(mut evaluator) = self.take(id) else {
            return;
        };
        if evaluator
            .flags()
            .contains(EvaluatorFlags::NEEDS_EVALUATION_UPDATE)
        {
            evaluator.on_run(self, params, out);
            self.restore(id, evaluator);
        } else {
            let children = evaluator.children();
            self.restore(id, evaluator);
            for child in children {
                self.run(child, params, out);
            }
        }
    }

    pub fn execute_operation(
        &mut self,
        id: EvaluatorId,
        params: &OperationParams,
        operation: &mut CameraOperation,
    ) {
        if !self.node(id).is_some_and(|n| n.is_enabled()) {
            return;
        }
        let Some(mut evaluator) = self.take(id) else {
            return;
        };
        if evaluator
            .flags()
            .contains(EvaluatorFlags::SUPPORTS_OPERATIONS)
        {
            evaluator.on_execute_operation(self, params, operation);
            self.restore(id, evaluator);
        } else {
            let children = evaluator.children();
            self.restore(id, evaluator);
            for child in children {
                self.execute_operation(child, params, operation);
            }
        }
    }

    pub fn collect_references(&self, id: EvaluatorId, collector: &mut ReferenceCollector) {
        let Some(slot) = self.slots.get(id.index()) else {
            return;
        };
        collector.add_node(&slot.node);
        if let Some(evaluator) = slot.evaluator.as_deref() {
            evaluator.on_collect_references(collector);
            for child in evaluator.children() {
                self.collect_references(child, collector);
            }
        }
    }

    pub fn serialize(&mut self, id: EvaluatorId, archive: &mut StateArchive) -> CameraResult<()> {
        let Some(mut evaluator) = self.take(id) else {
            return Ok(());
        };
        let result = evaluator.on_serialize(archive);
        let children = evaluator.children();
        self.restore(id, evaluator);
        result?;
        for child in children {
            self.serialize(child, archive)?;
        }
        Ok(())
    }

    pub fn build_debug_blocks(&self, id: EvaluatorId, builder: &mut DebugBlockBuilder) {
        let Some(slot) = self.slots.get(id.index()) else {
            return;
        };
        let Some(evaluator) = slot.evaluator.as_deref() else {
            return;
        };
        builder.start_block(slot.node.name());
        evaluator.on_build_debug_blocks(builder);
        if !builder.take_skip_children() {
            for child in evaluator.children() {
                self.build_debug_blocks(child, builder);
            }
        }
        builder.end_block();
    }

    /// Depth-first, pre-order search for evaluators carrying `flag`.
    ///
    /// The search does not descend below a match.
    pub fn gather_evaluators(&self, root: EvaluatorId, flag: EvaluatorFlags) -> Vec<EvaluatorId> {
        let mut found = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(evaluator) = self.evaluator(id) else {
                continue;
            };
            if evaluator.flags().contains(flag) {
                found.push(id);
            } else {
                stack.extend(evaluator.children().into_iter().rev());
            }
        }
        found
    }
}

/// Handed to [`NodeEvaluator::on_build`] so evaluators can instantiate their children.
pub struct EvaluatorBuilder<'a> {
    storage: &'a mut EvaluatorStorage,
}

impl EvaluatorBuilder<'_> {
    pub fn build_evaluator(&mut self, node: &Arc<dyn CameraNode>) -> EvaluatorId {
        let mut evaluator = Arc::clone(node).build_evaluator();
        let id = EvaluatorId(self.storage.slots.len() as u32);
        self.storage.slots.push(Slot {
            node: Arc::clone(node),
            evaluator: None,
        });
        evaluator.on_build(self);
        self.storage.restore(id, evaluator);
        id
    }

    pub fn build_optional(&mut self, node: Option<&Arc<dyn CameraNode>>) -> Option<EvaluatorId> {
        node.map(|n| self.build_evaluator(n))
    }

    /// Access an already-built evaluator, e.g. to subscribe to its events.
    pub fn evaluator_mut<T: NodeEvaluator>(&mut self, id: EvaluatorId) -> Option<&mut T> {
        self.storage.get_mut::<T>(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/storage.rs"]
mod tests;
