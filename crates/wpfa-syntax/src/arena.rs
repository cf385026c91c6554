//! Node arena for tree storage.

use crate::base::NodeIndex;
use crate::node::{Node, NodeData};
use wpfa_common::limits::MAX_TREE_WALK_DEPTH;

/// Arena-based storage for syntax nodes.
/// Nodes are stored contiguously and referenced by index.
#[derive(Debug, Default)]
pub struct NodeArena {
    pub nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena { nodes: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> NodeArena {
        NodeArena {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Add a node to the arena and return its index
    pub fn add(&mut self, node: Node) -> NodeIndex {
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        NodeIndex(index)
    }

    /// Get a node by index
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    /// Get a mutable node by index
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get_mut(index.0 as usize)
        }
    }

    /// Get the number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes of the subtree rooted at `root`, in pre-order (root first).
    pub fn descendants(&self, root: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        self.collect_descendants(root, 0, &mut out);
        out
    }

    fn collect_descendants(&self, idx: NodeIndex, depth: u32, out: &mut Vec<NodeIndex>) {
        if depth > MAX_TREE_WALK_DEPTH {
            return;
        }
        let Some(node) = self.get(idx) else {
            return;
        };
        out.push(idx);
        for child in node.data.children() {
            self.collect_descendants(child, depth + 1, out);
        }
    }

    /// Walk up the parent chain until a node matching `pred` is found.
    pub fn ancestor(&self, idx: NodeIndex, pred: impl Fn(&NodeData) -> bool) -> Option<NodeIndex> {
        let mut current = self.get(idx)?.parent;
        let mut steps = 0;
        while current.is_some() && steps <= MAX_TREE_WALK_DEPTH {
            let node = self.get(current)?;
            if pred(&node.data) {
                return Some(current);
            }
            current = node.parent;
            steps += 1;
        }
        None
    }
}
