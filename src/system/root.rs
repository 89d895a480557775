use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::asset::package::AssetBuildEvent;
use crate::asset::rig::CameraRigAsset;
use crate::asset::transition::CameraRigTransition;
use crate::blend::stack::{
    BlendStackCameraNode, BlendStackEvaluator, BlendStackPushParams, BlendStackRigEvent,
    BlendStackRigEventType, PushOutcome,
};
use crate::eval::context::{CameraRigEvaluationInfo, EvaluationContext};
use crate::foundation::error::{CameraError, CameraResult};
use crate::node::debug::DebugBlockBuilder;
use crate::node::evaluator::{
    CameraNode, EvaluatorChildren, EvaluatorFlags, EvaluatorId, NodeEvaluator,
};
use crate::node::storage::{EvaluatorBuilder, EvaluatorStorage};
use crate::system::settings::CameraSystemSettings;

/// Layers of the default root node, evaluated bottom to top.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CameraRigLayer {
    Base,
    #[default]
    Main,
    Global,
    Visual,
}

impl CameraRigLayer {
    pub const ALL: [Self; 4] = [Self::Base, Self::Main, Self::Global, Self::Visual];

    pub fn name(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Main => "main",
            Self::Global => "global",
            Self::Visual => "visual",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CameraRigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RootCameraRigEventType {
    Activated,
    Deactivated,
}

/// A rig entering or leaving one of the root node's layers.
#[derive(Clone, Debug)]
pub struct RootCameraRigEvent {
    pub event_type: RootCameraRigEventType,
    pub layer: CameraRigLayer,
    pub camera_rig_info: CameraRigEvaluationInfo,
    pub transition: Option<Arc<CameraRigTransition>>,
}

impl RootCameraRigEvent {
    fn from_stack(layer: CameraRigLayer, event: &BlendStackRigEvent) -> Self {
        let event_type = match event.event_type {
            BlendStackRigEventType::Pushed => RootCameraRigEventType::Activated,
            BlendStackRigEventType::Popped => RootCameraRigEventType::Deactivated,
        };
        Self {
            event_type,
            layer,
            camera_rig_info: event.camera_rig_info.clone(),
            transition: event.transition.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ActivateCameraRigParams {
    pub camera_rig: Arc<CameraRigAsset>,
    pub evaluation_context: Rc<EvaluationContext>,
    pub layer: CameraRigLayer,
}

/// Root of the camera system: one blend stack per [`CameraRigLayer`].
#[derive(Debug)]
pub struct DefaultRootCameraNode {
    layers: [Arc<BlendStackCameraNode>; 4],
}

impl DefaultRootCameraNode {
    pub fn new(settings: &CameraSystemSettings) -> Self {
        Self {
            layers: CameraRigLayer::ALL
                .map(|layer| Arc::new(settings.layer(layer).to_node(layer.name()))),
        }
    }

    pub fn layer(&self, layer: CameraRigLayer) -> &Arc<BlendStackCameraNode> {
        &self.layers[layer.index()]
    }
}

impl CameraNode for DefaultRootCameraNode {
    fn name(&self) -> &str {
        "root"
    }

    fn children(&self) -> Vec<Arc<dyn CameraNode>> {
        self.layers
            .iter()
            .map(|l| Arc::clone(l) as Arc<dyn CameraNode>)
            .collect()
    }

    fn build_evaluator(self: Arc<Self>) -> Box<dyn NodeEvaluator> {
        Box::new(DefaultRootEvaluator {
            node: self,
            layers: EvaluatorChildren::new(),
            events: Rc::default(),
        })
    }
}

/// Runs the layer stacks in order and turns their push/pop events into
/// [`RootCameraRigEvent`]s, queued until [`DefaultRootEvaluator::take_events`].
pub struct DefaultRootEvaluator {
    node: Arc<DefaultRootCameraNode>,
    layers: EvaluatorChildren,
    events: Rc<RefCell<Vec<RootCameraRigEvent>>>,
}

impl fmt::Debug for DefaultRootEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultRootEvaluator")
            .field("layers", &self.layers)
            .field("pending_events", &self.events.borrow().len())
            .finish()
    }
}

impl DefaultRootEvaluator {
    pub fn layer_evaluator(&self, layer: CameraRigLayer) -> Option<EvaluatorId> {
        self.layers.get(layer.index()).copied()
    }

    /// Push a rig onto its layer's blend stack.
    pub fn activate_camera_rig(
        &mut self,
        tree: &mut EvaluatorStorage,
        params: &ActivateCameraRigParams,
    ) -> CameraResult<PushOutcome> {
        let stack = self
            .layer_evaluator(params.layer)
            .and_then(|id| tree.get_mut::<BlendStackEvaluator>(id))
            .ok_or_else(|| {
                CameraError::config(format!("root node has no '{}' layer", params.layer))
            })?;
        stack.push(&BlendStackPushParams {
            camera_rig: Arc::clone(&params.camera_rig),
            evaluation_context: Rc::clone(&params.evaluation_context),
        })
    }

    /// Forward a rebuilt package to every layer. Returns how many entries were rebuilt.
    pub fn on_post_build_asset(
        &mut self,
        tree: &mut EvaluatorStorage,
        event: &AssetBuildEvent,
    ) -> usize {
        self.layers
            .iter()
            .map(|&id| {
                tree.get_mut::<BlendStackEvaluator>(id)
                    .map_or(0, |stack| stack.on_post_build_asset(event))
            })
            .sum()
    }

    pub fn take_events(&mut self) -> Vec<RootCameraRigEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl NodeEvaluator for DefaultRootEvaluator {
    fn flags(&self) -> EvaluatorFlags {
        EvaluatorFlags::empty()
    }

    fn children(&self) -> EvaluatorChildren {
        self.layers.clone()
    }

    fn on_build(&mut self, builder: &mut EvaluatorBuilder<'_>) {
        for layer in CameraRigLayer::ALL {
            let node: Arc<dyn CameraNode> =
                Arc::clone(self.node.layer(layer)) as Arc<dyn CameraNode>;
            let id = builder.build_evaluator(&node);
            if let Some(stack) = builder.evaluator_mut::<BlendStackEvaluator>(id) {
                let events = Rc::clone(&self.events);
                stack.on_camera_rig_event(move |event| {
                    events
                        .borrow_mut()
                        .push(RootCameraRigEvent::from_stack(layer, event));
                });
            }
            self.layers.push(id);
        }
    }

    fn on_build_debug_blocks(&self, builder: &mut DebugBlockBuilder) {
        let pending = self.events.borrow().len();
        if pending > 0 {
            builder.add_text(format!("{pending} pending events"));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/system/root.rs"]
mod tests;
