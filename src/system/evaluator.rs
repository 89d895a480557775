use std::rc::Rc;
use std::sync::Arc;

use crate::asset::package::AssetBuildEvent;
use crate::asset::rig::CameraRigAsset;
use crate::blend::stack::{BlendStackEvaluator, PushOutcome};
use crate::eval::context::{ContextStack, EvaluationContext};
use crate::eval::director::DirectorEvaluationParams;
use crate::eval::result::EvaluationResult;
use crate::foundation::archive::StateArchive;
use crate::foundation::core::{DQuat, DVec3};
use crate::foundation::error::{CameraError, CameraResult};
use crate::node::debug::DebugBlockBuilder;
use crate::node::evaluator::{
    CameraNode, CameraOperation, EvaluationParams, EvaluationType, EvaluatorId, OperationParams,
};
use crate::node::storage::EvaluatorStorage;
use crate::system::root::{
    ActivateCameraRigParams, CameraRigLayer, DefaultRootCameraNode, DefaultRootEvaluator,
};
use crate::system::services::{CameraEvaluationService, ServiceUpdateParams};
use crate::system::settings::CameraSystemSettings;

/// What a renderer needs from one evaluated frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CameraView {
    pub location: DVec3,
    pub rotation: DQuat,
    /// Horizontal, in degrees.
    pub field_of_view: f64,
    pub aspect_ratio: f64,
    pub near_clip_plane: f32,
    pub far_clip_plane: f32,
    pub is_camera_cut: bool,
}

/// Drives camera evaluation once per frame.
///
/// Owns the layered root node, the stack of evaluation contexts and the evaluation services.
/// Every frame the active context's director picks the rigs to activate, then the root node
/// runs every layer into one result.
#[derive(Debug)]
pub struct CameraSystemEvaluator {
    settings: CameraSystemSettings,
    context_stack: ContextStack,
    storage: EvaluatorStorage,
    root: EvaluatorId,
    result: EvaluationResult,
    services: Vec<Box<dyn CameraEvaluationService>>,
    is_first_frame: bool,
}

impl CameraSystemEvaluator {
    pub fn new(settings: CameraSystemSettings) -> CameraResult<Self> {
        let node: Arc<dyn CameraNode> = Arc::new(DefaultRootCameraNode::new(&settings));
        let mut storage = EvaluatorStorage::new();
        let root = storage.build_tree(&node)?;
        Ok(Self {
            settings,
            context_stack: ContextStack::default(),
            storage,
            root,
            result: EvaluationResult::default(),
            services: Vec::new(),
            is_first_frame: true,
        })
    }

    pub fn settings(&self) -> &CameraSystemSettings {
        &self.settings
    }

    pub fn register_service(&mut self, service: Box<dyn CameraEvaluationService>) {
        tracing::debug!(service = service.name(), "registered camera evaluation service");
        self.services.push(service);
    }

    pub fn push_evaluation_context(&mut self, context: &Rc<EvaluationContext>) {
        self.context_stack.push_context(context);
    }

    pub fn remove_evaluation_context(&mut self, context: &Rc<EvaluationContext>) -> bool {
        self.context_stack.remove_context(context)
    }

    pub fn pop_evaluation_context(&mut self) -> Option<Rc<EvaluationContext>> {
        self.context_stack.pop_context()
    }

    pub fn active_evaluation_context(&mut self) -> Option<Rc<EvaluationContext>> {
        self.context_stack.active_context()
    }

    /// Activate a rig directly, bypassing the directors.
    pub fn activate_camera_rig(
        &mut self,
        camera_rig: &Arc<CameraRigAsset>,
        context: &Rc<EvaluationContext>,
        layer: CameraRigLayer,
    ) -> CameraResult<PushOutcome> {
        let params = ActivateCameraRigParams {
            camera_rig: Arc::clone(camera_rig),
            evaluation_context: Rc::clone(context),
            layer,
        };
        self.storage
            .with_evaluator::<DefaultRootEvaluator, _>(self.root, |root, tree| {
                root.activate_camera_rig(tree, &params)
            })
            .ok_or_else(|| CameraError::config("camera system root is not a default root node"))?
    }

    /// Evaluate one frame.
    #[tracing::instrument(skip(self))]
    pub fn update(&mut self, delta_time: f32) {
        let context = self.context_stack.active_context();
        let service_params = ServiceUpdateParams {
            delta_time,
            evaluation_context: context.clone(),
        };
        for service in &mut self.services {
            service.on_pre_update(&service_params, &mut self.result);
        }

        let Some(context) = context else {
            self.result.is_valid = false;
            return;
        };

        let director_result = context.run_director(&DirectorEvaluationParams { delta_time });
        for active in &director_result.active_camera_rigs {
            if let Err(err) =
                self.activate_camera_rig(&active.camera_rig, &active.evaluation_context, active.layer)
            {
                tracing::error!(
                    rig = active.camera_rig.name(),
                    layer = %active.layer,
                    error = %err,
                    "failed to activate camera rig"
                );
            }
        }

        self.result.reset(false);
        let params = EvaluationParams {
            evaluation_context: Some(Rc::clone(&context)),
            delta_time,
            evaluation_type: EvaluationType::Standard,
            is_first_frame: self.is_first_frame,
        };
        self.storage.run(self.root, &params, &mut self.result);
        self.result.is_valid = true;
        self.is_first_frame = false;

        for service in &mut self.services {
            service.on_post_update(&service_params, &mut self.result);
        }
        self.dispatch_root_events();
    }

    fn dispatch_root_events(&mut self) {
        let events = self
            .storage
            .get_mut::<DefaultRootEvaluator>(self.root)
            .map(DefaultRootEvaluator::take_events)
            .unwrap_or_default();
        for event in &events {
            tracing::trace!(
                kind = ?event.event_type,
                layer = %event.layer,
                rig = event.camera_rig_info.camera_rig_name(),
                "camera rig event"
            );
            for service in &mut self.services {
                service.on_root_camera_rig_event(event);
            }
        }
    }

    pub fn evaluated_result(&self) -> &EvaluationResult {
        &self.result
    }

    /// `None` until a frame has been evaluated with an active context.
    pub fn evaluated_camera_view(&self) -> Option<CameraView> {
        if !self.result.is_valid {
            return None;
        }
        let pose = &self.result.camera_pose;
        Some(CameraView {
            location: pose.location(),
            rotation: pose.rotation(),
            field_of_view: pose.effective_field_of_view(),
            aspect_ratio: pose.aspect_ratio(),
            near_clip_plane: pose.near_clip_plane(),
            far_clip_plane: pose.far_clip_plane(),
            is_camera_cut: self.result.is_camera_cut,
        })
    }

    /// Apply an operation to every running rig.
    pub fn execute_operation(&mut self, mut operation: CameraOperation) {
        let params = OperationParams {
            evaluation_context: self.context_stack.active_context(),
        };
        self.storage
            .execute_operation(self.root, &params, &mut operation);
    }

    /// Rebuild running rigs after a package was rebuilt. Returns how many were rebuilt.
    pub fn notify_asset_built(&mut self, event: &AssetBuildEvent) -> usize {
        self.storage
            .with_evaluator::<DefaultRootEvaluator, _>(self.root, |root, tree| {
                root.on_post_build_asset(tree, event)
            })
            .unwrap_or(0)
    }

    /// The blend stack of `layer`.
    pub fn layer(&self, layer: CameraRigLayer) -> Option<&BlendStackEvaluator> {
        let id = self
            .storage
            .get::<DefaultRootEvaluator>(self.root)?
            .layer_evaluator(layer)?;
        self.storage.get::<BlendStackEvaluator>(id)
    }

    pub fn build_debug_blocks(&self) -> String {
        let mut builder = DebugBlockBuilder::new();
        self.storage.build_debug_blocks(self.root, &mut builder);
        builder.finish()
    }

    pub fn save_state(&mut self) -> CameraResult<StateArchive> {
        let mut archive = StateArchive::saving();
        self.serialize(&mut archive)?;
        Ok(archive)
    }

    /// Restore a state saved by [`CameraSystemEvaluator::save_state`] on a system running the
    /// same rigs.
    pub fn load_state(&mut self, archive: StateArchive) -> CameraResult<()> {
        let mut archive = if archive.is_loading() {
            archive
        } else {
            archive.into_loading()
        };
        self.serialize(&mut archive)
    }

    fn serialize(&mut self, archive: &mut StateArchive) -> CameraResult<()> {
        self.result.serialize(archive)?;
        archive.serialize(&mut self.is_first_frame)?;
        self.storage.serialize(self.root, archive)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/system/evaluator.rs"]
mod tests;
