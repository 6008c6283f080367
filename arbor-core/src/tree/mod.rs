//! Render Targets
//!
//! The composer never looks inside a node. Everything it needs from the
//! rendered tree goes through [`RenderTarget`]:
//!
//! - create a leaf node from a primitive value,
//! - create an invisible marker node that anchors a live binding,
//! - append a node to a container, or insert it before an anchor,
//! - detach a node (and its descendants) from its parent,
//! - dispose of a node the composer is done with, running the callbacks
//!   registered on it,
//! - find the mount root.
//!
//! The element factories in [`elements`](crate::elements) need a little
//! more, expressed by [`ElementTarget`].
//!
//! [`MemoryTarget`] is a headless implementation of both traits that keeps
//! the whole tree in memory.

mod memory;
mod node;

pub use memory::MemoryTarget;
pub use node::{MemoryNode, NodeKind};

/// The collaborator that owns the actual node tree.
///
/// Implementations use shared handles for nodes; cloning a handle must not
/// clone the underlying node.
pub trait RenderTarget: Send + Sync + 'static {
    /// Handle to a node in the tree.
    type Node: Clone + Send + Sync + 'static;

    /// Create a detached leaf node displaying `text`.
    fn create_leaf(&self, text: &str) -> Self::Node;

    /// Create a detached node that renders nothing.
    ///
    /// Live bindings keep one of these after their content so that updated
    /// content lands in the same position.
    fn create_marker(&self) -> Self::Node {
        self.create_leaf("")
    }

    /// Append `node` as the last child of `container`.
    fn append(&self, container: &Self::Node, node: &Self::Node);

    /// Insert `node` into `container` directly before `anchor`.
    ///
    /// `anchor` is always a child of `container` when called by the composer.
    fn insert_before(&self, container: &Self::Node, node: &Self::Node, anchor: &Self::Node);

    /// Detach `node` from its parent. Its descendants stay attached to it.
    fn detach(&self, node: &Self::Node);

    /// Detach `node` and free it together with its descendants.
    ///
    /// Dispose callbacks registered on the subtree run first, children
    /// before parents. The handles must not be attached again afterwards.
    fn dispose(&self, node: &Self::Node);

    /// Run `callback` once, when `node` is disposed.
    fn on_dispose(&self, node: &Self::Node, callback: Box<dyn FnOnce() + Send>);

    /// Look up a node by its identifier.
    fn find_by_id(&self, id: &str) -> Option<Self::Node>;

    /// The container used when no identifier is configured.
    fn default_container(&self) -> Self::Node;
}

/// A render target that can also build elements.
pub trait ElementTarget: RenderTarget {
    /// Create a detached element with the given tag name.
    fn create_element(&self, tag: &str) -> Self::Node;

    /// Set (or overwrite) an attribute on an element.
    fn set_attribute(&self, node: &Self::Node, key: &str, value: &str);

    /// Remove an attribute from an element, if present.
    fn remove_attribute(&self, node: &Self::Node, key: &str);
}
