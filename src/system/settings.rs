use crate::blend::stack::BlendStackCameraNode;
use crate::foundation::error::CameraResult;
use crate::system::root::CameraRigLayer;

/// Behavior of one layer's blend stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlendStackSettings {
    #[serde(default)]
    pub auto_pop: bool,
    #[serde(default)]
    pub blend_first_camera_rig: bool,
}

impl BlendStackSettings {
    pub const fn new(auto_pop: bool, blend_first_camera_rig: bool) -> Self {
        Self {
            auto_pop,
            blend_first_camera_rig,
        }
    }

    pub fn to_node(self, name: &str) -> BlendStackCameraNode {
        BlendStackCameraNode::new(name)
            .with_auto_pop(self.auto_pop)
            .with_blend_first_camera_rig(self.blend_first_camera_rig)
    }
}

/// Settings for the camera system's layered root node.
///
/// Only the main layer pops rigs once something blends over them; the other layers keep
/// every rig until it is deactivated and blend in their very first rig.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraSystemSettings {
    pub base_layer: BlendStackSettings,
    pub main_layer: BlendStackSettings,
    pub global_layer: BlendStackSettings,
    pub visual_layer: BlendStackSettings,
}

impl Default for CameraSystemSettings {
    fn default() -> Self {
        Self {
            base_layer: BlendStackSettings::new(false, true),
            main_layer: BlendStackSettings::new(true, false),
            global_layer: BlendStackSettings::new(false, true),
            visual_layer: BlendStackSettings::new(false, true),
        }
    }
}

impl CameraSystemSettings {
    pub fn from_json_str(s: &str) -> CameraResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> CameraResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn layer(&self, layer: CameraRigLayer) -> BlendStackSettings {
        match layer {
            CameraRigLayer::Base => self.base_layer,
            CameraRigLayer::Main => self.main_layer,
            CameraRigLayer::Global => self.global_layer,
            CameraRigLayer::Visual => self.visual_layer,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/system/settings.rs"]
mod tests;
