use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::asset::camera::CameraAsset;
use crate::asset::package::AssetBuildEvent;
use crate::asset::rig::CameraRigAsset;
use crate::asset::transition::{CameraRigTransition, TransitionConditionMatchParams};
use crate::blend::evaluator::{BlendParams, BlendResult, PreBlendParams, PreBlendResult};
use crate::blend::pop::PopBlendCameraNode;
use crate::blend::root::{BlendStackRootCameraNode, BlendStackRootEvaluator};
use crate::eval::context::{CameraRigEvaluationInfo, EvaluationContext};
use crate::eval::result::EvaluationResult;
use crate::foundation::archive::StateArchive;
use crate::foundation::error::{CameraError, CameraResult};
use crate::node::debug::{DebugBlockBuilder, ReferenceCollector};
use crate::node::evaluator::{
    CameraNode, CameraOperation, EvaluationParams, EvaluatorFlags, EvaluatorId,
    InitializeParams, NodeEvaluator, OperationParams, ParameterUpdateParams,
    ParameterUpdateResult,
};
use crate::node::storage::{EvaluatorAllocationInfo, EvaluatorStorage};
use crate::variables::VariableTableFilter;

/// A stack of camera rigs blending into each other.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlendStackCameraNode {
    pub name: String,
    /// Drop entries once a rig above them has fully blended in.
    pub auto_pop: bool,
    /// Look for an enter transition when pushing onto an empty stack.
    pub blend_first_camera_rig: bool,
}

impl BlendStackCameraNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            auto_pop: true,
            blend_first_camera_rig: false,
        }
    }

    pub fn with_auto_pop(mut self, auto_pop: bool) -> Self {
        self.auto_pop = auto_pop;
        self
    }

    pub fn with_blend_first_camera_rig(mut self, blend_first: bool) -> Self {
        self.blend_first_camera_rig = blend_first;
        self
    }
}

impl CameraNode for BlendStackCameraNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn build_evaluator(self: Arc<Self>) -> Box<dyn NodeEvaluator> {
        Box::new(BlendStackEvaluator::new(self))
    }
}

#[derive(Clone, Debug)]
pub struct BlendStackPushParams {
    pub camera_rig: Arc<CameraRigAsset>,
    pub evaluation_context: Rc<EvaluationContext>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed,
    /// The same rig and context were already on top; nothing changed.
    AlreadyActive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendStackRigEventType {
    Pushed,
    Popped,
}

#[derive(Clone, Debug)]
pub struct BlendStackRigEvent {
    pub event_type: BlendStackRigEventType,
    pub camera_rig_info: CameraRigEvaluationInfo,
    /// Transition used to push the rig, if any.
    pub transition: Option<Arc<CameraRigTransition>>,
}

pub type BlendStackRigEventListener = Box<dyn FnMut(&BlendStackRigEvent)>;

struct CameraRigEntry {
    evaluation_context: Weak<EvaluationContext>,
    camera_rig: Arc<CameraRigAsset>,
    root_node: Arc<BlendStackRootCameraNode>,
    storage: EvaluatorStorage,
    root_evaluator: Option<EvaluatorId>,
    blend_evaluator: Option<EvaluatorId>,
    rig_root_evaluator: Option<EvaluatorId>,
    parameter_evaluators: Vec<EvaluatorId>,
    result: EvaluationResult,
    is_first_frame: bool,
    input_run_this_frame: bool,
    blend_run_this_frame: bool,
    is_frozen: bool,
    log_warnings: bool,
}

impl CameraRigEntry {
    fn new(
        camera_rig: Arc<CameraRigAsset>,
        context: &Rc<EvaluationContext>,
        root_node: Arc<BlendStackRootCameraNode>,
    ) -> Self {
        Self {
            evaluation_context: Rc::downgrade(context),
            camera_rig,
            root_node,
            storage: EvaluatorStorage::new(),
            root_evaluator: None,
            blend_evaluator: None,
            rig_root_evaluator: None,
            parameter_evaluators: Vec::new(),
            result: EvaluationResult::default(),
            is_first_frame: true,
            input_run_this_frame: false,
            blend_run_this_frame: false,
            is_frozen: false,
            log_warnings: true,
        }
    }

    fn info(&self) -> CameraRigEvaluationInfo {
        CameraRigEvaluationInfo {
            evaluation_context: self.evaluation_context.upgrade(),
            camera_rig: Some(Arc::clone(&self.camera_rig)),
            last_camera_pose: Some(self.result.camera_pose),
            is_frozen: self.is_frozen,
        }
    }

    fn evaluation_params(
        &self,
        params: &EvaluationParams,
        context: Option<&Rc<EvaluationContext>>,
    ) -> EvaluationParams {
        EvaluationParams {
            evaluation_context: context.cloned(),
            delta_time: params.delta_time,
            evaluation_type: params.evaluation_type,
            is_first_frame: self.is_first_frame,
        }
    }

    /// Instantiate the evaluator tree and variables for the entry's rig.
    fn build(&mut self, last_active_camera_rig: &CameraRigEvaluationInfo) -> CameraResult<()> {
        if self.camera_rig.root_node().is_none() {
            tracing::error!(rig = self.camera_rig.name(), "camera rig has no root node");
            return Err(CameraError::config(format!(
                "camera rig '{}' has no root node",
                self.camera_rig.name()
            )));
        }

        let info = self.camera_rig.allocation_info();
        // One extra slot each for the wrapper and the blend.
        let mut storage = EvaluatorStorage::with_allocation_info(&EvaluatorAllocationInfo {
            evaluator_count: info.evaluator_info.evaluator_count + 2,
        });
        let root_node: Arc<dyn CameraNode> = Arc::clone(&self.root_node) as Arc<dyn CameraNode>;
        let root = storage.build_tree(&root_node)?;
        let (blend, rig_root) = match storage.get::<BlendStackRootEvaluator>(root) {
            Some(wrapper) => (wrapper.blend_evaluator(), wrapper.rig_root_evaluator()),
            None => (None, None),
        };
        if rig_root.is_none() {
            return Err(CameraError::config(format!(
                "no root evaluator was built for camera rig '{}'",
                self.camera_rig.name()
            )));
        }
        if let Some(blend) = blend
            && storage.blend_mut(blend).is_none()
        {
            tracing::error!(
                rig = self.camera_rig.name(),
                "transition blend node does not evaluate as a blend"
            );
            return Err(CameraError::config(format!(
                "transition blend for camera rig '{}' is not a blend node",
                self.camera_rig.name()
            )));
        }

        self.result = EvaluationResult::default();
        self.result
            .variable_table
            .initialize(&info.variable_table_info);

        let context = self.evaluation_context.upgrade();
        let init = InitializeParams {
            evaluation_context: context.as_ref(),
            last_active_camera_rig,
        };
        storage.initialize(root, &init, &mut self.result);

        self.parameter_evaluators =
            storage.gather_evaluators(root, EvaluatorFlags::NEEDS_PARAMETER_UPDATE);
        self.storage = storage;
        self.root_evaluator = Some(root);
        self.blend_evaluator = blend;
        self.rig_root_evaluator = rig_root;
        self.is_first_frame = true;
        Ok(())
    }

    fn freeze(&mut self) {
        self.storage.destroy_tree();
        self.root_evaluator = None;
        self.blend_evaluator = None;
        self.rig_root_evaluator = None;
        self.parameter_evaluators.clear();
        self.evaluation_context = Weak::new();
        self.is_frozen = true;
    }

    fn update_parameters(&mut self, params: &EvaluationParams) {
        if self.input_run_this_frame {
            return;
        }
        self.result.variable_table.clear_all_written_this_frame_flags();
        let update = ParameterUpdateParams {
            evaluation: params,
            last_camera_pose: &self.result.camera_pose,
        };
        let mut out = ParameterUpdateResult {
            variable_table: &mut self.result.variable_table,
        };
        for &id in &self.parameter_evaluators {
            self.storage.update_parameters(id, &update, &mut out);
        }
        self.input_run_this_frame = true;
    }

    fn run_blend(&mut self, params: &EvaluationParams) {
        if self.blend_run_this_frame {
            return;
        }
        match self.blend_evaluator {
            Some(blend) => self.storage.run(blend, params, &mut self.result),
            None => self.warn_missing_blend(),
        }
        self.blend_run_this_frame = true;
    }

    fn warn_missing_blend(&self) {
        tracing::warn!(
            rig = self.camera_rig.name(),
            "camera rig entry has no blend evaluator, treating as a cut"
        );
        debug_assert!(false, "missing blend evaluator for '{}'", self.camera_rig.name());
    }
}

impl fmt::Debug for CameraRigEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraRigEntry")
            .field("camera_rig", &self.camera_rig.name())
            .field("is_frozen", &self.is_frozen)
            .field("is_first_frame", &self.is_first_frame)
            .finish()
    }
}

enum EntryState {
    Live(Rc<EvaluationContext>),
    Frozen,
    /// Context alive but its initial result is not usable this frame.
    Skipped,
}

/// Owns, evaluates, blends and retires the camera rigs pushed onto one stack.
///
/// Each entry has its own evaluator storage and result. A frame runs five passes over the
/// entries, bottom to top:
/// 1. gather parameters and advance blends,
/// 2. blend input variables into the shared result,
/// 3. run each rig on top of what was blended so far,
/// 4. blend results into the shared result,
/// 5. pop entries covered by a fully blended rig.
pub struct BlendStackEvaluator {
    node: Arc<BlendStackCameraNode>,
    entries: Vec<CameraRigEntry>,
    listeners: Vec<BlendStackRigEventListener>,
}

impl fmt::Debug for BlendStackEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlendStackEvaluator")
            .field("node", &self.node.name)
            .field("entries", &self.entries)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl BlendStackEvaluator {
    pub fn new(node: Arc<BlendStackCameraNode>) -> Self {
        Self {
            node,
            entries: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn camera_rig_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.camera_rig.name()).collect()
    }

    pub fn is_entry_frozen(&self, index: usize) -> Option<bool> {
        self.entries.get(index).map(|e| e.is_frozen)
    }

    pub fn entry_result(&self, index: usize) -> Option<&EvaluationResult> {
        self.entries.get(index).map(|e| &e.result)
    }

    pub fn entry_storage(&self, index: usize) -> Option<&EvaluatorStorage> {
        self.entries.get(index).map(|e| &e.storage)
    }

    /// Root evaluator of the rig itself (not of the wrapper) at `index`.
    pub fn entry_rig_root(&self, index: usize) -> Option<EvaluatorId> {
        self.entries.get(index)?.rig_root_evaluator
    }

    pub fn entry_blend(&self, index: usize) -> Option<EvaluatorId> {
        self.entries.get(index)?.blend_evaluator
    }

    /// The oldest entry. Empty info when the stack is empty.
    pub fn bottom_camera_rig_info(&self) -> CameraRigEvaluationInfo {
        self.entries
            .first()
            .map(CameraRigEntry::info)
            .unwrap_or_default()
    }

    /// The newest entry. Empty info when the stack is empty.
    pub fn top_camera_rig_info(&self) -> CameraRigEvaluationInfo {
        self.entries
            .last()
            .map(CameraRigEntry::info)
            .unwrap_or_default()
    }

    pub fn on_camera_rig_event(&mut self, listener: impl FnMut(&BlendStackRigEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn broadcast(
        &mut self,
        event_type: BlendStackRigEventType,
        camera_rig_info: CameraRigEvaluationInfo,
        transition: Option<Arc<CameraRigTransition>>,
    ) {
        if self.listeners.is_empty() {
            return;
        }
        let event = BlendStackRigEvent {
            event_type,
            camera_rig_info,
            transition,
        };
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    /// Push a rig on top of the stack.
    ///
    /// Nothing changes when the same rig and context are already running on top, or when the
    /// rig's evaluator tree cannot be built.
    pub fn push(&mut self, params: &BlendStackPushParams) -> CameraResult<PushOutcome> {
        if let Some(top) = self.entries.last()
            && !top.is_frozen
            && Arc::ptr_eq(&top.camera_rig, &params.camera_rig)
            && std::ptr::eq(top.evaluation_context.as_ptr(), Rc::as_ptr(&params.evaluation_context))
        {
            return Ok(PushOutcome::AlreadyActive);
        }

        let transition = self.find_transition(params);
        let blend = transition
            .as_ref()
            .and_then(|t| t.blend().cloned())
            .unwrap_or_else(PopBlendCameraNode::shared);
        let root_node = Arc::new(BlendStackRootCameraNode::new(
            blend,
            params.camera_rig.root_node().cloned(),
        ));

        let mut entry = CameraRigEntry::new(
            Arc::clone(&params.camera_rig),
            &params.evaluation_context,
            root_node,
        );
        let last_active = self.top_camera_rig_info();
        entry.build(&last_active)?;

        tracing::debug!(
            stack = %self.node.name,
            rig = params.camera_rig.name(),
            context = params.evaluation_context.name(),
            with_transition = transition.is_some(),
            "pushed camera rig"
        );
        let info = entry.info();
        self.entries.push(entry);
        self.broadcast(BlendStackRigEventType::Pushed, info, transition);
        Ok(PushOutcome::Pushed)
    }

    /// First matching transition for pushing `params`, searched in a fixed order:
    /// the top rig's exit transitions, then its camera asset's (both skipped when the top
    /// entry is frozen), then the new rig's enter transitions, then its camera asset's.
    ///
    /// On an empty stack only the new rig's enter transitions are considered, and only when
    /// the stack blends its first rig in.
    pub fn find_transition(
        &self,
        params: &BlendStackPushParams,
    ) -> Option<Arc<CameraRigTransition>> {
        let to_rig = params.camera_rig.as_ref();
        let to_asset = params.evaluation_context.camera_asset().map(Arc::as_ref);

        let Some(top) = self.entries.last() else {
            if !self.node.blend_first_camera_rig {
                return None;
            }
            let match_params = TransitionConditionMatchParams {
                from_camera_rig: None,
                from_camera_asset: None,
                to_camera_rig: to_rig,
                to_camera_asset: to_asset,
                from_frozen: false,
            };
            return first_matching(to_rig.enter_transitions(), &match_params);
        };

        let from_context = top.evaluation_context.upgrade();
        let from_asset: Option<&CameraAsset> =
            from_context.as_ref().and_then(|c| c.camera_asset()).map(Arc::as_ref);
        let match_params = TransitionConditionMatchParams {
            from_camera_rig: Some(top.camera_rig.as_ref()),
            from_camera_asset: from_asset,
            to_camera_rig: to_rig,
            to_camera_asset: to_asset,
            from_frozen: top.is_frozen,
        };

        if !top.is_frozen {
            if let Some(t) = first_matching(top.camera_rig.exit_transitions(), &match_params) {
                return Some(t);
            }
            if let Some(asset) = from_asset
                && let Some(t) = first_matching(asset.exit_transitions(), &match_params)
            {
                return Some(t);
            }
        }

        if let Some(t) = first_matching(to_rig.enter_transitions(), &match_params) {
            return Some(t);
        }
        to_asset.and_then(|asset| first_matching(asset.enter_transitions(), &match_params))
    }

    /// Remove entries `[0, keep_from_index)`, oldest first.
    pub fn pop_entries(&mut self, keep_from_index: usize) {
        let count = keep_from_index.min(self.entries.len());
        for _ in 0..count {
            let entry = self.entries.remove(0);
            tracing::debug!(
                stack = %self.node.name,
                rig = entry.camera_rig.name(),
                "popped camera rig"
            );
            self.broadcast(BlendStackRigEventType::Popped, entry.info(), None);
        }
    }

    /// Stop evaluating the entry at `index`; it keeps contributing its last result.
    pub fn freeze_entry(&mut self, index: usize) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) if !entry.is_frozen => {
                entry.freeze();
                true
            }
            _ => false,
        }
    }

    /// Gather parameters and advance blends ahead of the run, e.g. for a preview.
    ///
    /// The next run skips whatever this already did this frame.
    pub fn update_entry_parameters(&mut self, params: &EvaluationParams) {
        for entry in &mut self.entries {
            if entry.is_frozen {
                continue;
            }
            let Some(context) = entry.evaluation_context.upgrade() else {
                continue;
            };
            let entry_params = entry.evaluation_params(params, Some(&context));
            entry.update_parameters(&entry_params);
            entry.run_blend(&entry_params);
        }
    }

    /// Rebuild entries whose rig depends on the rebuilt package.
    ///
    /// Rebuilt entries keep their position and context but cut in, without their transition.
    /// An entry that fails to rebuild is frozen. Returns how many entries were rebuilt.
    pub fn on_post_build_asset(&mut self, event: &AssetBuildEvent) -> usize {
        let mut rebuilt = 0;
        for index in 0..self.entries.len() {
            let last_active = self.top_camera_rig_info();
            let entry = &mut self.entries[index];
            if entry.is_frozen || !entry.camera_rig.depends_on(&event.package) {
                continue;
            }
            if let Some(new_rig) = event.rebuilt_rig(entry.camera_rig.name()) {
                entry.camera_rig = Arc::clone(new_rig);
            }

            entry.storage.destroy_tree();
            entry.root_node = Arc::new(BlendStackRootCameraNode::new(
                PopBlendCameraNode::shared(),
                entry.camera_rig.root_node().cloned(),
            ));
            match entry.build(&last_active) {
                Ok(()) => {
                    tracing::info!(
                        rig = entry.camera_rig.name(),
                        package = %event.package,
                        "rebuilt camera rig"
                    );
                    rebuilt += 1;
                }
                Err(err) => {
                    tracing::error!(
                        rig = entry.camera_rig.name(),
                        error = %err,
                        "failed to rebuild camera rig, freezing it"
                    );
                    entry.freeze();
                }
            }
        }
        rebuilt
    }

    fn resolve_entries(&mut self) -> Vec<EntryState> {
        let stack = &self.node.name;
        self.entries
            .iter_mut()
            .map(|entry| {
                if entry.is_frozen {
                    return EntryState::Frozen;
                }
                let Some(context) = entry.evaluation_context.upgrade() else {
                    if entry.log_warnings {
                        tracing::warn!(
                            %stack,
                            rig = entry.camera_rig.name(),
                            "freezing camera rig because its evaluation context is gone"
                        );
                        entry.log_warnings = false;
                    }
                    entry.freeze();
                    return EntryState::Frozen;
                };
                if !context.initial_result().is_valid {
                    if entry.log_warnings {
                        tracing::warn!(
                            %stack,
                            rig = entry.camera_rig.name(),
                            "camera rig skipped because its initial result is invalid"
                        );
                        entry.log_warnings = false;
                    }
                    return EntryState::Skipped;
                }
                entry.log_warnings = true;
                EntryState::Live(context)
            })
            .collect()
    }
}

fn first_matching(
    transitions: &[Arc<CameraRigTransition>],
    params: &TransitionConditionMatchParams<'_>,
) -> Option<Arc<CameraRigTransition>> {
    transitions
        .iter()
        .find(|t| t.conditions_match(params))
        .cloned()
}

impl NodeEvaluator for BlendStackEvaluator {
    fn flags(&self) -> EvaluatorFlags {
        EvaluatorFlags::NEEDS_EVALUATION_UPDATE | EvaluatorFlags::SUPPORTS_OPERATIONS
    }

    fn on_run(
        &mut self,
        _tree: &mut EvaluatorStorage,
        params: &EvaluationParams,
        out: &mut EvaluationResult,
    ) {
        let states = self.resolve_entries();

        // Parameters and blend progress. Last frame's pose only.
        for (entry, state) in self.entries.iter_mut().zip(&states) {
            let EntryState::Live(context) = state else {
                continue;
            };
            let entry_params = entry.evaluation_params(params, Some(context));
            entry.update_parameters(&entry_params);
            entry.run_blend(&entry_params);
        }

        // Input variables.
        for (entry, state) in self.entries.iter_mut().zip(&states) {
            match state {
                EntryState::Live(context) => {
                    let entry_params = entry.evaluation_params(params, Some(context));
                    let blend = entry.blend_evaluator.and_then(|id| entry.storage.blend_mut(id));
                    let Some(blend) = blend else {
                        entry.warn_missing_blend();
                        out.variable_table
                            .override_with(&entry.result.variable_table, VariableTableFilter::INPUT);
                        continue;
                    };
                    blend.blend_parameters(
                        &PreBlendParams {
                            evaluation: &entry_params,
                            last_camera_pose: &entry.result.camera_pose,
                            child_variable_table: &entry.result.variable_table,
                        },
                        &mut PreBlendResult {
                            variable_table: &mut out.variable_table,
                        },
                    );
                }
                EntryState::Frozen => {
                    out.variable_table
                        .override_with(&entry.result.variable_table, VariableTableFilter::INPUT);
                }
                EntryState::Skipped => {}
            }
        }

        // Rigs, each starting from what was blended below it.
        for (entry, state) in self.entries.iter_mut().zip(&states) {
            let EntryState::Live(context) = state else {
                continue;
            };
            let entry_params = entry.evaluation_params(params, Some(context));
            let result = &mut entry.result;
            result.camera_pose = out.camera_pose;
            result.variable_table.override_all(&out.variable_table);
            {
                let context_result = context.initial_result();
                result
                    .camera_pose
                    .override_changed(&context_result.camera_pose);
                result
                    .variable_table
                    .override_all(&context_result.variable_table);
                result.is_camera_cut = out.is_camera_cut || context_result.is_camera_cut;
            }
            result.is_valid = true;
            result.rig_joints.reset();
            result.camera_pose.clear_all_changed_flags();

            if let Some(rig_root) = entry.rig_root_evaluator {
                entry.storage.run(rig_root, &entry_params, result);
            }
        }

        // Results. Remember the topmost entry that fully covers the ones below it.
        let mut pop_below = None;
        for (index, (entry, state)) in self.entries.iter_mut().zip(&states).enumerate() {
            match state {
                EntryState::Live(context) => {
                    let entry_params = entry.evaluation_params(params, Some(context));
                    let blend = entry.blend_evaluator.and_then(|id| entry.storage.blend_mut(id));
                    if let Some(blend) = blend {
                        let mut blend_result = BlendResult::new(out);
                        blend.blend_results(
                            &BlendParams {
                                evaluation: &entry_params,
                                child_result: &entry.result,
                            },
                            &mut blend_result,
                        );
                        if blend_result.is_blend_full && blend_result.is_blend_finished {
                            pop_below = Some(index);
                        }
                    } else {
                        out.camera_pose.override_all(&entry.result.camera_pose);
                        out.variable_table.override_all(&entry.result.variable_table);
                        pop_below = Some(index);
                    }
                }
                EntryState::Frozen => {
                    out.camera_pose.override_all(&entry.result.camera_pose);
                    out.variable_table.override_all(&entry.result.variable_table);
                    pop_below = Some(index);
                }
                EntryState::Skipped => {}
            }
        }
        if self.node.auto_pop
            && let Some(index) = pop_below
        {
            self.pop_entries(index);
        }

        for entry in &mut self.entries {
            entry.is_first_frame = false;
            entry.input_run_this_frame = false;
            entry.blend_run_this_frame = false;
        }
    }

    fn on_execute_operation(
        &mut self,
        _tree: &mut EvaluatorStorage,
        params: &OperationParams,
        operation: &mut CameraOperation,
    ) {
        for entry in &mut self.entries {
            if let Some(rig_root) = entry.rig_root_evaluator {
                entry.storage.execute_operation(rig_root, params, operation);
            }
        }
    }

    fn on_collect_references(&self, collector: &mut ReferenceCollector) {
        for entry in &self.entries {
            collector.add_camera_rig(&entry.camera_rig);
            match entry.root_evaluator {
                Some(root) => entry.storage.collect_references(root, collector),
                None => {
                    let node: Arc<dyn CameraNode> =
                        Arc::clone(&entry.root_node) as Arc<dyn CameraNode>;
                    collector.add_node(&node);
                }
            }
        }
    }

    fn on_serialize(&mut self, archive: &mut StateArchive) -> CameraResult<()> {
        let mut count = self.entries.len();
        archive.serialize(&mut count)?;
        if archive.is_loading() && count != self.entries.len() {
            tracing::error!(
                stack = %self.node.name,
                expected = self.entries.len(),
                loaded = count,
                "blend stack entry count mismatch"
            );
            return Err(CameraError::state(format!(
                "blend stack '{}' has {} entries, archive has {count}",
                self.node.name,
                self.entries.len()
            )));
        }

        for entry in &mut self.entries {
            entry.result.serialize(archive)?;
            archive.serialize(&mut entry.is_first_frame)?;
            archive.serialize(&mut entry.input_run_this_frame)?;
            archive.serialize(&mut entry.blend_run_this_frame)?;
            archive.serialize(&mut entry.is_frozen)?;
            archive.serialize(&mut entry.log_warnings)?;
        }

        for entry in &mut self.entries {
            let mut has_tree = entry.root_evaluator.is_some();
            archive.serialize(&mut has_tree)?;
            match entry.root_evaluator {
                Some(root) if has_tree => entry.storage.serialize(root, archive)?,
                None if !has_tree => {}
                _ => {
                    return Err(CameraError::state(format!(
                        "camera rig '{}' evaluator tree does not match the archive",
                        entry.camera_rig.name()
                    )));
                }
            }
        }
        Ok(())
    }

    fn on_build_debug_blocks(&self, builder: &mut DebugBlockBuilder) {
        builder.add_text(format!("{} entries", self.entries.len()));
        for (index, entry) in self.entries.iter().enumerate() {
            builder.start_block(&format!("[{}] {}", index + 1, entry.camera_rig.name()));
            if entry.is_frozen {
                builder.add_text("frozen");
            }
            if let Some(blend) = entry.blend_evaluator {
                entry.storage.build_debug_blocks(blend, builder);
            }
            let pose = &entry.result.camera_pose;
            let location = pose.location();
            builder.add_text(format!(
                "location: ({:.2}, {:.2}, {:.2}) fov: {:.1}",
                location.x,
                location.y,
                location.z,
                pose.effective_field_of_view()
            ));
            builder.add_text(format!("variables: {}", entry.result.variable_table.len()));
            builder.end_block();
        }
        builder.skip_children();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/stack.rs"]
mod tests;
