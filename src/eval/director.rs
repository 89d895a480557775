use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::asset::rig::CameraRigAsset;
use crate::eval::context::EvaluationContext;
use crate::system::root::CameraRigLayer;

#[derive(Clone, Copy, Debug, Default)]
pub struct DirectorEvaluationParams {
    pub delta_time: f32,
}

/// A rig a director wants running, and where.
#[derive(Clone, Debug)]
pub struct ActiveCameraRigInfo {
    pub camera_rig: Arc<CameraRigAsset>,
    pub evaluation_context: Rc<EvaluationContext>,
    pub layer: CameraRigLayer,
}

#[derive(Clone, Debug, Default)]
pub struct DirectorEvaluationResult {
    pub active_camera_rigs: Vec<ActiveCameraRigInfo>,
}

impl DirectorEvaluationResult {
    pub fn add(&mut self, camera_rig: Arc<CameraRigAsset>, context: &Rc<EvaluationContext>) {
        self.add_on_layer(camera_rig, context, CameraRigLayer::Main);
    }

    pub fn add_on_layer(
        &mut self,
        camera_rig: Arc<CameraRigAsset>,
        context: &Rc<EvaluationContext>,
        layer: CameraRigLayer,
    ) {
        self.active_camera_rigs.push(ActiveCameraRigInfo {
            camera_rig,
            evaluation_context: Rc::clone(context),
            layer,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.active_camera_rigs.is_empty()
    }
}

/// Picks the camera rigs a context wants active, once per frame.
pub trait CameraDirectorEvaluator: fmt::Debug {
    fn run(
        &mut self,
        owner: &Rc<EvaluationContext>,
        params: &DirectorEvaluationParams,
        out: &mut DirectorEvaluationResult,
    );
}

/// Director that always asks for the same rig.
#[derive(Clone, Debug)]
pub struct SingleCameraDirector {
    camera_rig: Arc<CameraRigAsset>,
}

impl SingleCameraDirector {
    pub fn new(camera_rig: Arc<CameraRigAsset>) -> Self {
        Self { camera_rig }
    }
}

impl CameraDirectorEvaluator for SingleCameraDirector {
    fn run(
        &mut self,
        owner: &Rc<EvaluationContext>,
        _params: &DirectorEvaluationParams,
        out: &mut DirectorEvaluationResult,
    ) {
        out.add(Arc::clone(&self.camera_rig), owner);
    }
}

/// Director whose rig can be swapped from gameplay code between frames.
#[derive(Debug, Default)]
pub struct SwitchableCameraDirector {
    camera_rig: Rc<std::cell::RefCell<Option<Arc<CameraRigAsset>>>>,
}

impl SwitchableCameraDirector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle used to change the requested rig later.
    pub fn handle(&self) -> CameraDirectorHandle {
        CameraDirectorHandle {
            camera_rig: Rc::clone(&self.camera_rig),
        }
    }
}

impl CameraDirectorEvaluator for SwitchableCameraDirector {
    fn run(
        &mut self,
        owner: &Rc<EvaluationContext>,
        _params: &DirectorEvaluationParams,
        out: &mut DirectorEvaluationResult,
    ) {
        if let Some(rig) = self.camera_rig.borrow().as_ref() {
            out.add(Arc::clone(rig), owner);
        }
    }
}

#[derive(Clone, Debug)]
pub struct CameraDirectorHandle {
    camera_rig: Rc<std::cell::RefCell<Option<Arc<CameraRigAsset>>>>,
}

impl CameraDirectorHandle {
    pub fn set_camera_rig(&self, camera_rig: Option<Arc<CameraRigAsset>>) {
        *self.camera_rig.borrow_mut() = camera_rig;
    }
}
