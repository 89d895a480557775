//! The camera system: layered root node, evaluation services and the per-frame driver.

pub mod evaluator;
pub mod root;
pub mod services;
pub mod settings;

pub use evaluator::{CameraSystemEvaluator, CameraView};
pub use root::{
    ActivateCameraRigParams, CameraRigLayer, DefaultRootCameraNode, DefaultRootEvaluator,
    RootCameraRigEvent, RootCameraRigEventType,
};
pub use services::{AutoResetCameraVariableService, CameraEvaluationService, ServiceUpdateParams};
pub use settings::{BlendStackSettings, CameraSystemSettings};
