use crate::eval::pose::CameraPose;
use crate::foundation::archive::StateArchive;
use crate::foundation::core::Transform3;
use crate::foundation::error::CameraResult;
use crate::foundation::math::Lerp;
use crate::variables::{VariableId, VariableTable};

/// A rig joint exposed for external solvers (IK, previews).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraRigJoint {
    pub variable_id: VariableId,
    pub transform: Transform3,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraRigJoints {
    joints: Vec<CameraRigJoint>,
}

impl CameraRigJoints {
    pub fn add_joint(&mut self, variable_id: VariableId, transform: Transform3) {
        self.joints.push(CameraRigJoint {
            variable_id,
            transform,
        });
    }

    pub fn joints(&self) -> &[CameraRigJoint] {
        &self.joints
    }

    pub fn reset(&mut self) {
        self.joints.clear();
    }

    pub fn override_all(&mut self, other: &CameraRigJoints) {
        self.joints.clone_from(&other.joints);
    }

    /// Blend joints that exist on both sides, take the rest from `to`.
    pub fn lerp_all(&mut self, to: &CameraRigJoints, factor: f64) {
        if factor >= 1.0 {
            self.override_all(to);
            return;
        }
        for joint in &to.joints {
            match self
                .joints
                .iter_mut()
                .find(|j| j.variable_id == joint.variable_id)
            {
                Some(local) => {
                    local.transform = Transform3::lerp(&local.transform, &joint.transform, factor);
                }
                None => self.joints.push(*joint),
            }
        }
    }
}

/// Everything one frame of evaluation produces.
#[derive(Clone, Debug, Default)]
pub struct EvaluationResult {
    pub camera_pose: CameraPose,
    pub variable_table: VariableTable,
    pub rig_joints: CameraRigJoints,
    /// The pose does not continue from last frame's pose.
    pub is_camera_cut: bool,
    pub is_valid: bool,
}

impl EvaluationResult {
    /// Clear per-frame state. Variables are kept unless `reset_variable_table` is set.
    pub fn reset(&mut self, reset_variable_table: bool) {
        self.camera_pose.reset();
        if reset_variable_table {
            self.variable_table.unset_all_values();
        }
        self.rig_joints.reset();
        self.is_camera_cut = false;
        self.is_valid = false;
    }

    pub fn override_all(&mut self, other: &EvaluationResult) {
        self.camera_pose.override_all(&other.camera_pose);
        self.variable_table.override_all(&other.variable_table);
        self.rig_joints.override_all(&other.rig_joints);
        self.is_camera_cut |= other.is_camera_cut;
    }

    pub fn lerp_all(&mut self, to: &EvaluationResult, factor: f64) {
        self.camera_pose.lerp_all(&to.camera_pose, factor);
        self.variable_table.lerp_all(&to.variable_table, factor);
        self.rig_joints.lerp_all(&to.rig_joints, factor);
        self.is_camera_cut |= to.is_camera_cut;
    }

    pub fn serialize(&mut self, archive: &mut StateArchive) -> CameraResult<()> {
        archive.serialize(&mut self.camera_pose)?;
        self.variable_table.serialize(archive)?;
        archive.serialize(&mut self.rig_joints)?;
        archive.serialize(&mut self.is_camera_cut)?;
        archive.serialize(&mut self.is_valid)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/result.rs"]
mod tests;
