use std::sync::Arc;

use crate::eval::result::EvaluationResult;
use crate::foundation::archive::StateArchive;
use crate::foundation::core::{DVec3, axis};
use crate::foundation::error::CameraResult;
use crate::node::debug::DebugBlockBuilder;
use crate::node::evaluator::{CameraNode, EvaluationParams, InitializeParams, NodeEvaluator};
use crate::node::storage::EvaluatorStorage;

/// Critically damped spring towards zero.
///
/// `x0` is the remaining offset, `v0` its velocity, `w0` the natural frequency. A
/// non-positive frequency means no damping: the offset collapses immediately.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CriticalDamper {
    pub w0: f64,
    pub x0: f64,
    pub v0: f64,
}

impl CriticalDamper {
    pub fn new(w0: f64) -> Self {
        Self { w0, x0: 0.0, v0: 0.0 }
    }

    pub fn reset(&mut self, x0: f64, v0: f64) {
        self.x0 = x0;
        self.v0 = v0;
    }

    /// Start from offset `x`, advance by `dt` and return the new offset.
    pub fn update(&mut self, x: f64, dt: f64) -> f64 {
        if self.w0 <= 0.0 {
            self.reset(0.0, 0.0);
            return 0.0;
        }
        let w0 = self.w0;
        let decay = (-w0 * dt).exp();
        let j = self.v0 + w0 * x;
        self.x0 = (x + j * dt) * decay;
        self.v0 = (self.v0 - j * w0 * dt) * decay;
        self.x0
    }
}

/// Lags the camera location behind its target with one damper per camera axis.
#[derive(Clone, Debug)]
pub struct DampenPositionCameraNode {
    pub forward_damping: f64,
    pub lateral_damping: f64,
    pub vertical_damping: f64,
}

impl DampenPositionCameraNode {
    pub fn new(damping: f64) -> Self {
        Self {
            forward_damping: damping,
            lateral_damping: damping,
            vertical_damping: damping,
        }
    }
}

impl CameraNode for DampenPositionCameraNode {
    fn name(&self) -> &str {
        "dampen_position"
    }

    fn build_evaluator(self: Arc<Self>) -> Box<dyn NodeEvaluator> {
        Box::new(DampenPositionEvaluator {
            dampers: [
                CriticalDamper::new(self.forward_damping),
                CriticalDamper::new(self.lateral_damping),
                CriticalDamper::new(self.vertical_damping),
            ],
            previous_location: DVec3::ZERO,
            node: self,
        })
    }
}

#[derive(Debug)]
pub struct DampenPositionEvaluator {
    node: Arc<DampenPositionCameraNode>,
    dampers: [CriticalDamper; 3],
    previous_location: DVec3,
}

impl DampenPositionEvaluator {
    pub fn previous_location(&self) -> DVec3 {
        self.previous_location
    }
}

impl NodeEvaluator for DampenPositionEvaluator {
    fn on_initialize(&mut self, params: &InitializeParams<'_>, _out: &mut EvaluationResult) {
        for damper in &mut self.dampers {
            damper.reset(0.0, 0.0);
        }
        if let Some(context) = params.evaluation_context {
            self.previous_location = context.initial_result().camera_pose.location();
        }
    }

    fn on_run(
        &mut self,
        _tree: &mut EvaluatorStorage,
        params: &EvaluationParams,
        out: &mut EvaluationResult,
    ) {
        let target = out.camera_pose.location();
        if params.is_first_frame || out.is_camera_cut {
            self.previous_location = target;
            return;
        }

        let rotation = out.camera_pose.rotation();
        let lag = target - self.previous_location;
        let dt = f64::from(params.delta_time);
        let mut next = self.previous_location;
        for (damper, local_axis) in self
            .dampers
            .iter_mut()
            .zip([axis::FORWARD, axis::RIGHT, axis::UP])
        {
            let world_axis = rotation * local_axis;
            let offset = lag.dot(world_axis);
            let remaining = damper.update(offset, dt);
            next += world_axis * (offset - remaining);
        }

        self.previous_location = next;
        out.camera_pose.set_location(next);
    }

    fn on_serialize(&mut self, archive: &mut StateArchive) -> CameraResult<()> {
        archive.serialize(&mut self.dampers)?;
        archive.serialize(&mut self.previous_location)
    }

    fn on_build_debug_blocks(&self, builder: &mut DebugBlockBuilder) {
        let node = &self.node;
        builder.add_text(format!(
            "damping: {:.1} / {:.1} / {:.1}",
            node.forward_damping, node.lateral_damping, node.vertical_damping
        ));
        let [f, l, v] = &self.dampers;
        builder.add_text(format!(
            "lag: forward {:.2} lateral {:.2} vertical {:.2}",
            f.x0, l.x0, v.x0
        ));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/nodes/dampen.rs"]
mod tests;
