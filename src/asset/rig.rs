use std::sync::Arc;

use crate::asset::package::PackageId;
use crate::asset::transition::CameraRigTransition;
use crate::node::evaluator::{CameraNode, count_nodes};
use crate::node::storage::EvaluatorAllocationInfo;
use crate::variables::{VariableDefinition, VariableTableAllocationInfo};

/// Sizes needed to instantiate a rig, computed once from its node tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraRigAllocationInfo {
    pub evaluator_info: EvaluatorAllocationInfo,
    pub variable_table_info: VariableTableAllocationInfo,
}

/// A named tree of camera nodes plus the transitions used to blend in and out of it.
#[derive(Debug)]
pub struct CameraRigAsset {
    name: String,
    root_node: Option<Arc<dyn CameraNode>>,
    enter_transitions: Vec<Arc<CameraRigTransition>>,
    exit_transitions: Vec<Arc<CameraRigTransition>>,
    allocation_info: CameraRigAllocationInfo,
    interface_parameters: Vec<VariableDefinition>,
    packages: Vec<PackageId>,
}

impl CameraRigAsset {
    pub fn builder(name: impl Into<String>) -> CameraRigAssetBuilder {
        let name = name.into();
        CameraRigAssetBuilder {
            package: PackageId::new(name.clone()),
            name,
            root_node: None,
            enter_transitions: Vec::new(),
            exit_transitions: Vec::new(),
            extra_packages: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_node(&self) -> Option<&Arc<dyn CameraNode>> {
        self.root_node.as_ref()
    }

    pub fn enter_transitions(&self) -> &[Arc<CameraRigTransition>] {
        &self.enter_transitions
    }

    pub fn exit_transitions(&self) -> &[Arc<CameraRigTransition>] {
        &self.exit_transitions
    }

    pub fn allocation_info(&self) -> &CameraRigAllocationInfo {
        &self.allocation_info
    }

    /// Input variables other systems may drive.
    pub fn interface_parameters(&self) -> &[VariableDefinition] {
        &self.interface_parameters
    }

    /// The rig's own package first, then the packages it depends on.
    pub fn packages(&self) -> &[PackageId] {
        &self.packages
    }

    pub fn depends_on(&self, package: &PackageId) -> bool {
        self.packages.contains(package)
    }
}

pub struct CameraRigAssetBuilder {
    name: String,
    package: PackageId,
    root_node: Option<Arc<dyn CameraNode>>,
    enter_transitions: Vec<Arc<CameraRigTransition>>,
    exit_transitions: Vec<Arc<CameraRigTransition>>,
    extra_packages: Vec<PackageId>,
}

impl CameraRigAssetBuilder {
    pub fn root_node(mut self, node: Arc<dyn CameraNode>) -> Self {
        self.root_node = Some(node);
        self
    }

    pub fn enter_transition(mut self, transition: CameraRigTransition) -> Self {
        self.enter_transitions.push(Arc::new(transition));
        self
    }

    pub fn exit_transition(mut self, transition: CameraRigTransition) -> Self {
        self.exit_transitions.push(Arc::new(transition));
        self
    }

    /// Package the rig is stored in. Defaults to one named after the rig.
    pub fn package(mut self, package: PackageId) -> Self {
        self.package = package;
        self
    }

    pub fn depends_on(mut self, package: PackageId) -> Self {
        self.extra_packages.push(package);
        self
    }

    pub fn build(self) -> Arc<CameraRigAsset> {
        let mut allocation_info = CameraRigAllocationInfo::default();
        if let Some(root) = &self.root_node {
            allocation_info.evaluator_info.evaluator_count = count_nodes(root);
            declare_tree_variables(root, &mut allocation_info.variable_table_info);
        } else {
            tracing::warn!(rig = %self.name, "camera rig has no root node");
        }

        let interface_parameters = allocation_info
            .variable_table_info
            .definitions
            .iter()
            .filter(|d| d.is_input)
            .cloned()
            .collect();

        let mut packages = vec![self.package];
        for p in self.extra_packages {
            if !packages.contains(&p) {
                packages.push(p);
            }
        }

        Arc::new(CameraRigAsset {
            name: self.name,
            root_node: self.root_node,
            enter_transitions: self.enter_transitions,
            exit_transitions: self.exit_transitions,
            allocation_info,
            interface_parameters,
            packages,
        })
    }
}

fn declare_tree_variables(node: &Arc<dyn CameraNode>, info: &mut VariableTableAllocationInfo) {
    node.declare_variables(info);
    for child in node.children() {
        declare_tree_variables(&child, info);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/asset/rig.rs"]
mod tests;
