//! Tree Nodes
//!
//! This module defines the node types that live in a [`MemoryTarget`](super::MemoryTarget).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

/// Handle to a node owned by a [`MemoryTarget`](super::MemoryTarget).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryNode(u64);

impl MemoryNode {
    /// Generate a new unique node handle.
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MemoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of node in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A leaf holding text.
    Text(String),

    /// An element with a tag name. Elements may have children.
    Element(String),

    /// An invisible anchor left by a live binding.
    Marker,
}

/// A node in the tree.
#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,

    /// The node this one is attached to, if any.
    pub(crate) parent: Option<MemoryNode>,

    /// Children in document order.
    pub(crate) children: Vec<MemoryNode>,

    /// Attributes in the order they were first set.
    pub(crate) attributes: IndexMap<String, String>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: IndexMap::new(),
        }
    }

    /// Check if this node is a text leaf.
    pub(crate) fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }
}
