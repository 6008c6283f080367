//! In-memory render target.
//!
//! Keeps every node in a map indexed by handle for O(1) lookups, with parent
//! links and ordered child lists. A detached node stays valid until it is
//! disposed; disposing frees its whole subtree and runs the dispose
//! callbacks registered on it.

use std::collections::HashMap;
use std::fmt;

use parking_lot::{Mutex, RwLock};
use tracing::{trace, warn};

use super::node::{MemoryNode, NodeData, NodeKind};
use super::{ElementTarget, RenderTarget};

type DisposeFn = Box<dyn FnOnce() + Send>;

/// A headless, thread-safe render target.
///
/// Created with a `body` element that serves as the default container.
pub struct MemoryTarget {
    nodes: RwLock<HashMap<MemoryNode, NodeData>>,
    on_dispose: Mutex<HashMap<MemoryNode, Vec<DisposeFn>>>,
    body: MemoryNode,
}

impl MemoryTarget {
    /// Create a target holding only the `body` element.
    pub fn new() -> Self {
        let body = MemoryNode::new();
        let mut nodes = HashMap::new();
        nodes.insert(body, NodeData::new(NodeKind::Element("body".into())));
        Self {
            nodes: RwLock::new(nodes),
            on_dispose: Mutex::new(HashMap::new()),
            body,
        }
    }

    /// The `body` element.
    pub fn body(&self) -> MemoryNode {
        self.body
    }

    fn insert(&self, kind: NodeKind) -> MemoryNode {
        let id = MemoryNode::new();
        self.nodes.write().insert(id, NodeData::new(kind));
        id
    }

    /// Move `node` into `container`, before `anchor` or at the end.
    fn place(&self, container: MemoryNode, node: MemoryNode, anchor: Option<MemoryNode>) {
        let mut nodes = self.nodes.write();
        if !nodes.contains_key(&node) {
            warn!(%container, %node, "node was disposed, not placed");
            return;
        }
        unlink(&mut nodes, node);

        let Some(parent) = nodes.get_mut(&container) else {
            warn!(%container, %node, "container is not a node of this target");
            return;
        };
        let index = anchor.and_then(|anchor| parent.children.iter().position(|c| *c == anchor));
        match index {
            Some(i) => parent.children.insert(i, node),
            None => {
                if let Some(anchor) = anchor {
                    warn!(%container, %anchor, "anchor is not a child of the container, appending");
                }
                parent.children.push(node);
            }
        }
        if let Some(child) = nodes.get_mut(&node) {
            child.parent = Some(container);
        }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// All children of `node`, markers included, in order.
    pub fn children(&self, node: &MemoryNode) -> Vec<MemoryNode> {
        self.nodes
            .read()
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Children of `node` that are not markers, in order.
    pub fn content_children(&self, node: &MemoryNode) -> Vec<MemoryNode> {
        let nodes = self.nodes.read();
        nodes
            .get(node)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|c| nodes.get(c).is_some_and(|d| d.kind != NodeKind::Marker))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Text of the direct text children of `node`, in order.
    pub fn texts(&self, node: &MemoryNode) -> Vec<String> {
        let nodes = self.nodes.read();
        let Some(data) = nodes.get(node) else {
            return Vec::new();
        };
        data.children
            .iter()
            .filter_map(|c| match nodes.get(c).map(|d| &d.kind) {
                Some(NodeKind::Text(text)) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Concatenated text of every text descendant of `node`.
    pub fn text_content(&self, node: &MemoryNode) -> String {
        let nodes = self.nodes.read();
        let mut out = String::new();
        collect_text(&nodes, *node, &mut out);
        out
    }

    /// The kind of `node`.
    pub fn kind(&self, node: &MemoryNode) -> Option<NodeKind> {
        self.nodes.read().get(node).map(|n| n.kind.clone())
    }

    /// The tag name of an element.
    pub fn tag(&self, node: &MemoryNode) -> Option<String> {
        match self.kind(node)? {
            NodeKind::Element(tag) => Some(tag),
            _ => None,
        }
    }

    /// An attribute value of `node`.
    pub fn attribute(&self, node: &MemoryNode, key: &str) -> Option<String> {
        self.nodes
            .read()
            .get(node)
            .and_then(|n| n.attributes.get(key).cloned())
    }

    /// The parent of `node`, if attached.
    pub fn parent(&self, node: &MemoryNode) -> Option<MemoryNode> {
        self.nodes.read().get(node).and_then(|n| n.parent)
    }

    /// Whether `node` is connected to `body`.
    pub fn is_attached(&self, node: &MemoryNode) -> bool {
        let nodes = self.nodes.read();
        connected(&nodes, *node, self.body)
    }

    /// Check if `node` has not been disposed.
    pub fn contains(&self, node: &MemoryNode) -> bool {
        self.nodes.read().contains_key(node)
    }

    /// Number of live nodes, including `body`.
    pub fn node_count(&self) -> usize {
        self.nodes.read().len()
    }

    /// Number of nodes with dispose callbacks pending.
    pub fn pending_dispose_count(&self) -> usize {
        self.on_dispose.lock().len()
    }
}

impl fmt::Debug for MemoryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTarget")
            .field("body", &self.body)
            .field("node_count", &self.node_count())
            .field("pending_dispose", &self.pending_dispose_count())
            .finish()
    }
}

impl Default for MemoryTarget {
    fn default() -> Self {
        Self::new()
    }
}

fn unlink(nodes: &mut HashMap<MemoryNode, NodeData>, node: MemoryNode) {
    let Some(parent) = nodes.get_mut(&node).and_then(|n| n.parent.take()) else {
        return;
    };
    if let Some(parent) = nodes.get_mut(&parent) {
        parent.children.retain(|c| *c != node);
    }
}

fn connected(nodes: &HashMap<MemoryNode, NodeData>, mut node: MemoryNode, root: MemoryNode) -> bool {
    loop {
        if node == root {
            return true;
        }
        match nodes.get(&node).and_then(|n| n.parent) {
            Some(parent) => node = parent,
            None => return false,
        }
    }
}

/// `node` and its descendants, parents before children.
fn collect_subtree(nodes: &HashMap<MemoryNode, NodeData>, node: MemoryNode, out: &mut Vec<MemoryNode>) {
    let Some(data) = nodes.get(&node) else {
        return;
    };
    out.push(node);
    for child in &data.children {
        collect_subtree(nodes, *child, out);
    }
}

fn collect_text(nodes: &HashMap<MemoryNode, NodeData>, node: MemoryNode, out: &mut String) {
    let Some(data) = nodes.get(&node) else {
        return;
    };
    if let NodeKind::Text(text) = &data.kind {
        out.push_str(text);
    }
    for child in &data.children {
        collect_text(nodes, *child, out);
    }
}

impl RenderTarget for MemoryTarget {
    type Node = MemoryNode;

    fn create_leaf(&self, text: &str) -> MemoryNode {
        self.insert(NodeKind::Text(text.to_string()))
    }

    fn create_marker(&self) -> MemoryNode {
        self.insert(NodeKind::Marker)
    }

    fn append(&self, container: &MemoryNode, node: &MemoryNode) {
        trace!(%container, %node, "append");
        self.place(*container, *node, None);
    }

    fn insert_before(&self, container: &MemoryNode, node: &MemoryNode, anchor: &MemoryNode) {
        trace!(%container, %node, %anchor, "insert before");
        self.place(*container, *node, Some(*anchor));
    }

    fn detach(&self, node: &MemoryNode) {
        trace!(%node, "detach");
        unlink(&mut self.nodes.write(), *node);
    }

    fn dispose(&self, node: &MemoryNode) {
        if *node == self.body {
            warn!(%node, "body cannot be disposed");
            return;
        }
        let subtree = {
            let nodes = self.nodes.read();
            let mut out = Vec::new();
            collect_subtree(&nodes, *node, &mut out);
            out
        };
        if subtree.is_empty() {
            return;
        }
        trace!(%node, nodes = subtree.len(), "dispose");

        // Callbacks run unlocked: releasing a binding disposes nodes of its own.
        for id in subtree.iter().rev() {
            let callbacks = self.on_dispose.lock().remove(id);
            for callback in callbacks.into_iter().flatten() {
                callback();
            }
        }

        let mut nodes = self.nodes.write();
        unlink(&mut nodes, *node);
        for id in subtree {
            nodes.remove(&id);
        }
    }

    fn on_dispose(&self, node: &MemoryNode, callback: Box<dyn FnOnce() + Send>) {
        if !self.contains(node) {
            trace!(%node, "node already disposed, running callback now");
            callback();
            return;
        }
        self.on_dispose.lock().entry(*node).or_default().push(callback);
    }

    fn find_by_id(&self, id: &str) -> Option<MemoryNode> {
        let nodes = self.nodes.read();
        nodes
            .iter()
            .filter(|(_, data)| data.attributes.get("id").is_some_and(|v| v == id))
            .map(|(handle, _)| *handle)
            .find(|handle| connected(&nodes, *handle, self.body))
    }

    fn default_container(&self) -> MemoryNode {
        self.body
    }
}

impl ElementTarget for MemoryTarget {
    fn create_element(&self, tag: &str) -> MemoryNode {
        self.insert(NodeKind::Element(tag.to_string()))
    }

    fn set_attribute(&self, node: &MemoryNode, key: &str, value: &str) {
        match self.nodes.write().get_mut(node) {
            Some(data) if !data.is_text() => {
                data.attributes.insert(key.to_string(), value.to_string());
            }
            _ => warn!(%node, key, "attributes can only be set on elements"),
        }
    }

    fn remove_attribute(&self, node: &MemoryNode, key: &str) {
        if let Some(data) = self.nodes.write().get_mut(node) {
            data.attributes.shift_remove(key);
        }
    }
}
