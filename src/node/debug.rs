use std::sync::Arc;

use crate::asset::rig::CameraRigAsset;
use crate::node::evaluator::CameraNode;

/// Indented text report of a live evaluator tree.
///
/// Purely diagnostic: building a report never changes evaluation.
#[derive(Debug, Default)]
pub struct DebugBlockBuilder {
    lines: Vec<String>,
    depth: usize,
    skip_children: bool,
}

impl DebugBlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_block(&mut self, title: &str) {
        self.push_line(title);
        self.depth += 1;
    }

    pub fn end_block(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn add_text(&mut self, text: impl AsRef<str>) {
        self.push_line(text.as_ref());
    }

    /// Skip the generic child walk for the block being built; the caller reports them itself.
    pub fn skip_children(&mut self) {
        self.skip_children = true;
    }

    pub(crate) fn take_skip_children(&mut self) -> bool {
        std::mem::take(&mut self.skip_children)
    }

    fn push_line(&mut self, text: &str) {
        self.lines.push(format!("{}{}", "  ".repeat(self.depth), text));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}

/// Gathers the shared assets a live evaluator tree keeps alive.
#[derive(Debug, Default)]
pub struct ReferenceCollector {
    nodes: Vec<Arc<dyn CameraNode>>,
    camera_rigs: Vec<Arc<CameraRigAsset>>,
}

impl ReferenceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: &Arc<dyn CameraNode>) {
        if !self.nodes.iter().any(|n| Arc::ptr_eq(n, node)) {
            self.nodes.push(Arc::clone(node));
        }
    }

    pub fn add_camera_rig(&mut self, rig: &Arc<CameraRigAsset>) {
        if !self.camera_rigs.iter().any(|r| Arc::ptr_eq(r, rig)) {
            self.camera_rigs.push(Arc::clone(rig));
        }
    }

    pub fn nodes(&self) -> &[Arc<dyn CameraNode>] {
        &self.nodes
    }

    pub fn camera_rigs(&self) -> &[Arc<CameraRigAsset>] {
        &self.camera_rigs
    }

    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name()).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/debug.rs"]
mod tests;
