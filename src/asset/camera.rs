use std::sync::Arc;

use crate::asset::package::PackageId;
use crate::asset::transition::CameraRigTransition;

/// Camera-level configuration shared by every rig an evaluation context runs.
///
/// Its transitions are searched after the rig's own ones.
#[derive(Debug)]
pub struct CameraAsset {
    name: String,
    package: PackageId,
    enter_transitions: Vec<Arc<CameraRigTransition>>,
    exit_transitions: Vec<Arc<CameraRigTransition>>,
}

impl CameraAsset {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            package: PackageId::new(name.clone()),
            name,
            enter_transitions: Vec::new(),
            exit_transitions: Vec::new(),
        }
    }

    pub fn with_package(mut self, package: PackageId) -> Self {
        self.package = package;
        self
    }

    pub fn with_enter_transition(mut self, transition: CameraRigTransition) -> Self {
        self.enter_transitions.push(Arc::new(transition));
        self
    }

    pub fn with_exit_transition(mut self, transition: CameraRigTransition) -> Self {
        self.exit_transitions.push(Arc::new(transition));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package(&self) -> &PackageId {
        &self.package
    }

    pub fn enter_transitions(&self) -> &[Arc<CameraRigTransition>] {
        &self.enter_transitions
    }

    pub fn exit_transitions(&self) -> &[Arc<CameraRigTransition>] {
        &self.exit_transitions
    }
}
