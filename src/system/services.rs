use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::eval::context::EvaluationContext;
use crate::eval::result::EvaluationResult;
use crate::system::root::{RootCameraRigEvent, RootCameraRigEventType};
use crate::variables::VariableId;

#[derive(Clone, Debug, Default)]
pub struct ServiceUpdateParams {
    pub delta_time: f32,
    /// The context evaluated this frame, if any.
    pub evaluation_context: Option<Rc<EvaluationContext>>,
}

/// Hooks into the camera system's frame, around the root node's evaluation.
pub trait CameraEvaluationService: fmt::Debug {
    fn name(&self) -> &str;

    fn on_pre_update(&mut self, _params: &ServiceUpdateParams, _result: &mut EvaluationResult) {}

    fn on_post_update(&mut self, _params: &ServiceUpdateParams, _result: &mut EvaluationResult) {}

    fn on_root_camera_rig_event(&mut self, _event: &RootCameraRigEvent) {}
}

/// Unsets auto-reset variables at the end of every frame while a rig using them is active.
///
/// Values are cleared from the system result and from the active context's initial result,
/// so gameplay code has to write them again every frame.
///
/// Rigs are reference counted per variable: a variable stops being reset once every rig
/// declaring it has been deactivated.
#[derive(Debug, Default)]
pub struct AutoResetCameraVariableService {
    variables: BTreeMap<VariableId, usize>,
}

impl AutoResetCameraVariableService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracked_variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.variables.keys().copied()
    }

    pub fn is_tracked(&self, id: VariableId) -> bool {
        self.variables.contains_key(&id)
    }
}

impl CameraEvaluationService for AutoResetCameraVariableService {
    fn name(&self) -> &str {
        "auto_reset_variables"
    }

    fn on_post_update(&mut self, params: &ServiceUpdateParams, result: &mut EvaluationResult) {
        if self.variables.is_empty() {
            return;
        }
        let mut context_result = params
            .evaluation_context
            .as_ref()
            .map(|c| c.initial_result_mut());
        for &id in self.variables.keys() {
            result.variable_table.unset_value(id);
            if let Some(context_result) = context_result.as_mut() {
                context_result.variable_table.unset_value(id);
            }
        }
    }

    fn on_root_camera_rig_event(&mut self, event: &RootCameraRigEvent) {
        let Some(rig) = event.camera_rig_info.camera_rig.as_ref() else {
            return;
        };
        let auto_reset = rig
            .allocation_info()
            .variable_table_info
            .definitions
            .iter()
            .filter(|d| d.auto_reset);
        for definition in auto_reset {
            match event.event_type {
                RootCameraRigEventType::Activated => {
                    *self.variables.entry(definition.id).or_default() += 1;
                }
                RootCameraRigEventType::Deactivated => {
                    if let Some(count) = self.variables.get_mut(&definition.id) {
                        *count -= 1;
                        if *count == 0 {
                            self.variables.remove(&definition.id);
                        }
                    } else {
                        tracing::debug!(
                            variable = %definition.name,
                            "deactivated rig had an untracked auto-reset variable"
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/system/services.rs"]
mod tests;
