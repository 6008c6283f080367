//! Slots: declarative descriptions of content.

use std::fmt;
use std::sync::Arc;

use crate::reactive::{Cell, Subscription};

/// A description of content to render into a container.
///
/// Most values convert into a slot with `into()`: strings and numbers become
/// text, vectors and arrays become sequences, `None` and `()` are absent, and
/// a [`Cell`] becomes a live slot whose content follows the cell.
pub enum Slot<N> {
    /// Nothing is rendered.
    Absent,

    /// Each element is resolved in order against the same container.
    Many(Vec<Slot<N>>),

    /// A pre-built node, attached as-is.
    Node(N),

    /// A live value, re-resolved whenever it changes.
    Reactive(Arc<dyn SlotSource<N>>),

    /// A primitive value, rendered as a leaf.
    Text(String),
}

impl<N> Slot<N> {
    /// Wrap a pre-built node.
    pub fn node(node: N) -> Self {
        Slot::Node(node)
    }

    /// A text slot.
    pub fn text(text: impl Into<String>) -> Self {
        Slot::Text(text.into())
    }

    /// Check if this slot renders nothing by itself.
    pub fn is_absent(&self) -> bool {
        matches!(self, Slot::Absent)
    }
}

impl<N: Clone> Clone for Slot<N> {
    fn clone(&self) -> Self {
        match self {
            Slot::Absent => Slot::Absent,
            Slot::Many(items) => Slot::Many(items.clone()),
            Slot::Node(node) => Slot::Node(node.clone()),
            Slot::Reactive(source) => Slot::Reactive(Arc::clone(source)),
            Slot::Text(text) => Slot::Text(text.clone()),
        }
    }
}

impl<N> Default for Slot<N> {
    fn default() -> Self {
        Slot::Absent
    }
}

impl<N: fmt::Debug> fmt::Debug for Slot<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Absent => f.write_str("Absent"),
            Slot::Many(items) => f.debug_tuple("Many").field(items).finish(),
            Slot::Node(node) => f.debug_tuple("Node").field(node).finish(),
            Slot::Reactive(source) => f
                .debug_struct("Reactive")
                .field("source", &source.source_id())
                .finish(),
            Slot::Text(text) => f.debug_tuple("Text").field(text).finish(),
        }
    }
}

/// A live producer of slots.
///
/// This is the only view the composer has of a reactive value. It is
/// implemented for every [`Cell`] whose value converts into a slot.
pub trait SlotSource<N>: Send + Sync {
    /// The slot for the current value.
    fn current_slot(&self) -> Slot<N>;

    /// Invoke `observer` with the slot for every future value.
    ///
    /// The slot reflects the value held when the observer runs, which
    /// differs from the written one only under re-entrant writes.
    fn subscribe_slot(&self, observer: Box<dyn Fn(Slot<N>) + Send + Sync>) -> Subscription;

    /// Identifier of the underlying reactive value.
    fn source_id(&self) -> u64;
}

impl<N, T> SlotSource<N> for Cell<T>
where
    N: 'static,
    T: Clone + Send + Sync + Into<Slot<N>> + 'static,
{
    fn current_slot(&self) -> Slot<N> {
        self.get().into()
    }

    fn subscribe_slot(&self, observer: Box<dyn Fn(Slot<N>) + Send + Sync>) -> Subscription {
        self.subscribe_latest(move |value: &T| observer(value.clone().into()))
    }

    fn source_id(&self) -> u64 {
        self.id()
    }
}

// ----------------------------------------------------------------------------
// Conversions
// ----------------------------------------------------------------------------

impl<N> From<()> for Slot<N> {
    fn from(_: ()) -> Self {
        Slot::Absent
    }
}

impl<N, T: Into<Slot<N>>> From<Option<T>> for Slot<N> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Slot::Absent, Into::into)
    }
}

impl<N, T: Into<Slot<N>>> From<Vec<T>> for Slot<N> {
    fn from(items: Vec<T>) -> Self {
        Slot::Many(items.into_iter().map(Into::into).collect())
    }
}

impl<N, T: Into<Slot<N>>, const LEN: usize> From<[T; LEN]> for Slot<N> {
    fn from(items: [T; LEN]) -> Self {
        Slot::Many(items.into_iter().map(Into::into).collect())
    }
}

impl<N, T> From<Cell<T>> for Slot<N>
where
    N: 'static,
    T: Clone + Send + Sync + Into<Slot<N>> + 'static,
{
    fn from(cell: Cell<T>) -> Self {
        Slot::Reactive(Arc::new(cell))
    }
}

impl<N, T> From<&Cell<T>> for Slot<N>
where
    N: 'static,
    T: Clone + Send + Sync + Into<Slot<N>> + 'static,
{
    fn from(cell: &Cell<T>) -> Self {
        Slot::Reactive(Arc::new(cell.clone()))
    }
}

impl<N> From<&str> for Slot<N> {
    fn from(text: &str) -> Self {
        Slot::Text(text.to_string())
    }
}

impl<N> From<String> for Slot<N> {
    fn from(text: String) -> Self {
        Slot::Text(text)
    }
}

impl<N> From<&String> for Slot<N> {
    fn from(text: &String) -> Self {
        Slot::Text(text.clone())
    }
}

macro_rules! display_slot {
    ($($ty:ty),*) => {
        $(
            impl<N> From<$ty> for Slot<N> {
                fn from(value: $ty) -> Self {
                    Slot::Text(value.to_string())
                }
            }
        )*
    };
}

display_slot!(char, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
