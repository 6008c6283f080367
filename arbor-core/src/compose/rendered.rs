//! The result of resolving a slot.

/// What a slot turned into once attached to a container.
///
/// Mirrors the shape of the slot: a sequence slot yields a sequence of
/// representations, a reactive slot yields the representation of the value
/// it held at resolve time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<N> {
    /// Nothing was attached.
    Nothing,

    /// A single attached node.
    Node(N),

    /// One representation per element of a sequence slot, in order.
    Many(Vec<Rendered<N>>),
}

impl<N> Rendered<N> {
    /// Check if nothing was attached.
    pub fn is_nothing(&self) -> bool {
        matches!(self, Rendered::Nothing)
    }

    /// Number of nodes in the representation.
    pub fn len(&self) -> usize {
        match self {
            Rendered::Nothing => 0,
            Rendered::Node(_) => 1,
            Rendered::Many(items) => items.iter().map(Rendered::len).sum(),
        }
    }

    /// Check if the representation holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All nodes, flattened, in attachment order.
    pub fn nodes(&self) -> Vec<&N> {
        let mut out = Vec::with_capacity(self.len());
        self.collect_nodes(&mut out);
        out
    }

    fn collect_nodes<'a>(&'a self, out: &mut Vec<&'a N>) {
        match self {
            Rendered::Nothing => {}
            Rendered::Node(node) => out.push(node),
            Rendered::Many(items) => {
                for item in items {
                    item.collect_nodes(out);
                }
            }
        }
    }
}

impl<N> Default for Rendered<N> {
    fn default() -> Self {
        Rendered::Nothing
    }
}
