use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::asset::camera::CameraAsset;
use crate::asset::rig::CameraRigAsset;
use crate::eval::director::{
    CameraDirectorEvaluator, DirectorEvaluationParams, DirectorEvaluationResult,
};
use crate::eval::pose::CameraPose;
use crate::eval::result::EvaluationResult;

/// Who is asking for camera evaluation.
///
/// Contexts are owned by gameplay code. The camera system only observes them through weak
/// references, so a context can disappear between two frames.
pub struct EvaluationContext {
    name: String,
    camera_asset: Option<Arc<CameraAsset>>,
    initial_result: RefCell<EvaluationResult>,
    director: RefCell<Option<Box<dyn CameraDirectorEvaluator>>>,
}

impl fmt::Debug for EvaluationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationContext")
            .field("name", &self.name)
            .field(
                "camera_asset",
                &self.camera_asset.as_ref().map(|a| a.name().to_owned()),
            )
            .field("has_director", &self.director.borrow().is_some())
            .finish()
    }
}

impl EvaluationContext {
    /// A context with no asset and no director, whose initial result is valid.
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Self::builder(name).build()
    }

    pub fn builder(name: impl Into<String>) -> EvaluationContextBuilder {
        EvaluationContextBuilder {
            name: name.into(),
            camera_asset: None,
            director: None,
            initial_pose: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn camera_asset(&self) -> Option<&Arc<CameraAsset>> {
        self.camera_asset.as_ref()
    }

    /// Game-side state seeded into every rig this context runs (e.g. the owner's transform).
    pub fn initial_result(&self) -> Ref<'_, EvaluationResult> {
        self.initial_result.borrow()
    }

    pub fn initial_result_mut(&self) -> RefMut<'_, EvaluationResult> {
        self.initial_result.borrow_mut()
    }

    pub fn has_director(&self) -> bool {
        self.director.borrow().is_some()
    }

    pub fn set_director(&self, director: Box<dyn CameraDirectorEvaluator>) {
        *self.director.borrow_mut() = Some(director);
    }

    /// Ask this context's director which rigs should be active this frame.
    pub fn run_director(
        self: &Rc<Self>,
        params: &DirectorEvaluationParams,
    ) -> DirectorEvaluationResult {
        let mut out = DirectorEvaluationResult::default();
        if let Some(director) = self.director.borrow_mut().as_mut() {
            director.run(self, params, &mut out);
        }
        out
    }
}

pub struct EvaluationContextBuilder {
    name: String,
    camera_asset: Option<Arc<CameraAsset>>,
    director: Option<Box<dyn CameraDirectorEvaluator>>,
    initial_pose: Option<CameraPose>,
}

impl EvaluationContextBuilder {
    pub fn camera_asset(mut self, asset: Arc<CameraAsset>) -> Self {
        self.camera_asset = Some(asset);
        self
    }

    pub fn director(mut self, director: Box<dyn CameraDirectorEvaluator>) -> Self {
        self.director = Some(director);
        self
    }

    pub fn initial_pose(mut self, pose: CameraPose) -> Self {
        self.initial_pose = Some(pose);
        self
    }

    pub fn build(self) -> Rc<EvaluationContext> {
        let mut initial_result = EvaluationResult {
            is_valid: true,
            ..Default::default()
        };
        if let Some(pose) = self.initial_pose {
            initial_result.camera_pose = pose;
        }
        Rc::new(EvaluationContext {
            name: self.name,
            camera_asset: self.camera_asset,
            initial_result: RefCell::new(initial_result),
            director: RefCell::new(self.director),
        })
    }
}

/// Snapshot describing one running camera rig, handed to listeners and new evaluators.
#[derive(Clone, Debug, Default)]
pub struct CameraRigEvaluationInfo {
    pub evaluation_context: Option<Rc<EvaluationContext>>,
    pub camera_rig: Option<Arc<CameraRigAsset>>,
    pub last_camera_pose: Option<CameraPose>,
    pub is_frozen: bool,
}

impl CameraRigEvaluationInfo {
    pub fn camera_rig_name(&self) -> Option<&str> {
        self.camera_rig.as_deref().map(CameraRigAsset::name)
    }
}

/// Stack of evaluation contexts; the top live one is active.
#[derive(Debug, Default)]
pub struct ContextStack {
    entries: Vec<Weak<EvaluationContext>>,
}

impl ContextStack {
    /// Push a context, moving it to the top if it is already present.
    pub fn push_context(&mut self, context: &Rc<EvaluationContext>) {
        let weak = Rc::downgrade(context);
        self.entries.retain(|e| !Weak::ptr_eq(e, &weak));
        self.entries.push(weak);
    }

    pub fn remove_context(&mut self, context: &Rc<EvaluationContext>) -> bool {
        let weak = Rc::downgrade(context);
        let before = self.entries.len();
        self.entries.retain(|e| !Weak::ptr_eq(e, &weak));
        self.entries.len() != before
    }

    /// Pop the top live context.
    pub fn pop_context(&mut self) -> Option<Rc<EvaluationContext>> {
        while let Some(weak) = self.entries.pop() {
            if let Some(context) = weak.upgrade() {
                return Some(context);
            }
        }
        None
    }

    /// The top live context. Dead contexts on top are dropped.
    pub fn active_context(&mut self) -> Option<Rc<EvaluationContext>> {
        while let Some(weak) = self.entries.last() {
            if let Some(context) = weak.upgrade() {
                return Some(context);
            }
            self.entries.pop();
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/context.rs"]
mod tests;
