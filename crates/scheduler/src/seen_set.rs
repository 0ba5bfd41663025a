use std::collections::HashSet;

use calmfeed_core_types::NodeId;

/// Nodes whose content was measured and allowed. Blocked content is never
/// remembered, so it is scored again on every cycle.
#[derive(Debug, Default)]
pub struct SeenSet {
    allowed: HashSet<NodeId>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_resolved_allow(&self, node: NodeId) -> bool {
        self.allowed.contains(&node)
    }

    pub fn record_allow(&mut self, node: NodeId) {
        self.allowed.insert(node);
    }

    /// Drops every node for which `is_attached` is false; returns how many.
    pub fn prune<F>(&mut self, mut is_attached: F) -> usize
    where
        F: FnMut(NodeId) -> bool,
    {
        let before = self.allowed.len();
        self.allowed.retain(|&node| is_attached(node));
        before - self.allowed.len()
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_nodes_are_resolved() {
        let mut seen = SeenSet::new();
        assert!(!seen.is_resolved_allow(NodeId(4)));
        seen.record_allow(NodeId(4));
        seen.record_allow(NodeId(4));
        assert!(seen.is_resolved_allow(NodeId(4)));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn prune_drops_detached_nodes() {
        let mut seen = SeenSet::new();
        for id in 1..=4 {
            seen.record_allow(NodeId(id));
        }
        let removed = seen.prune(|node| node.0 % 2 == 0);
        assert_eq!(removed, 2);
        assert!(seen.is_resolved_allow(NodeId(2)));
        assert!(!seen.is_resolved_allow(NodeId(3)));
    }
}
