use std::fmt;
use std::sync::Arc;

use crate::asset::camera::CameraAsset;
use crate::asset::rig::CameraRigAsset;
use crate::node::evaluator::CameraNode;

/// What a transition condition gets to look at.
#[derive(Clone, Copy, Debug)]
pub struct TransitionConditionMatchParams<'a> {
    pub from_camera_rig: Option<&'a CameraRigAsset>,
    pub from_camera_asset: Option<&'a CameraAsset>,
    pub to_camera_rig: &'a CameraRigAsset,
    pub to_camera_asset: Option<&'a CameraAsset>,
    /// The rig being left lost its evaluation context.
    pub from_frozen: bool,
}

pub trait TransitionCondition: fmt::Debug {
    fn matches(&self, params: &TransitionConditionMatchParams<'_>) -> bool;
}

/// Rule for blending into (or out of) a camera rig.
#[derive(Debug, Default)]
pub struct CameraRigTransition {
    conditions: Vec<Box<dyn TransitionCondition>>,
    blend: Option<Arc<dyn CameraNode>>,
}

impl CameraRigTransition {
    pub fn new(blend: Arc<dyn CameraNode>) -> Self {
        Self {
            conditions: Vec::new(),
            blend: Some(blend),
        }
    }

    /// A transition without a blend node. Using it falls back to a cut.
    pub fn without_blend() -> Self {
        Self::default()
    }

    pub fn with_condition(mut self, condition: impl TransitionCondition + 'static) -> Self {
        self.conditions.push(Box::new(condition));
        self
    }

    pub fn blend(&self) -> Option<&Arc<dyn CameraNode>> {
        self.blend.as_ref()
    }

    pub fn conditions(&self) -> &[Box<dyn TransitionCondition>] {
        &self.conditions
    }

    /// `true` when every condition matches; a transition without conditions always does.
    pub fn conditions_match(&self, params: &TransitionConditionMatchParams<'_>) -> bool {
        self.conditions.iter().all(|c| c.matches(params))
    }
}

/// Matches when the rig being left has the given name.
#[derive(Clone, Debug)]
pub struct PreviousRigCondition {
    pub camera_rig_name: String,
}

impl PreviousRigCondition {
    pub fn new(camera_rig_name: impl Into<String>) -> Self {
        Self {
            camera_rig_name: camera_rig_name.into(),
        }
    }
}

impl TransitionCondition for PreviousRigCondition {
    fn matches(&self, params: &TransitionConditionMatchParams<'_>) -> bool {
        params
            .from_camera_rig
            .is_some_and(|r| r.name() == self.camera_rig_name)
    }
}

/// Matches when the rig being entered has the given name.
#[derive(Clone, Debug)]
pub struct NextRigCondition {
    pub camera_rig_name: String,
}

impl NextRigCondition {
    pub fn new(camera_rig_name: impl Into<String>) -> Self {
        Self {
            camera_rig_name: camera_rig_name.into(),
        }
    }
}

impl TransitionCondition for NextRigCondition {
    fn matches(&self, params: &TransitionConditionMatchParams<'_>) -> bool {
        params.to_camera_rig.name() == self.camera_rig_name
    }
}

/// Matches on whether the rig being left is frozen.
#[derive(Clone, Copy, Debug)]
pub struct FrozenSourceCondition {
    pub frozen: bool,
}

impl TransitionCondition for FrozenSourceCondition {
    fn matches(&self, params: &TransitionConditionMatchParams<'_>) -> bool {
        params.from_frozen == self.frozen
    }
}
