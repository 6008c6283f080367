//! Composer Implementation
//!
//! The composer turns slots into attached nodes and keeps reactive slots
//! live.
//!
//! # How Resolution Works
//!
//! 1. Absent slots attach nothing.
//!
//! 2. Sequences resolve each element in order against the same container.
//!
//! 3. Pre-built nodes are attached as-is; primitives become leaves.
//!
//! 4. A reactive slot resolves its current value, then leaves a marker node
//!    after that content and subscribes to the value. On every write the
//!    binding tears down its previous content (releasing any nested
//!    bindings) and resolves the new value in front of its marker, so the
//!    content keeps its position among its siblings.
//!
//! # Ownership
//!
//! Content a binding tears down is disposed through
//! [`RenderTarget::dispose`], pre-built nodes included: a node handed to a
//! slot belongs to that slot from then on. Dispose callbacks registered on
//! those nodes run at that point, which is how elements release the
//! bindings inside them (see [`Composer::adopt`]). [`Composer::remove`] only
//! detaches.
//!
//! # Re-entrant Writes
//!
//! A binding always renders the value its cell holds when the binding's
//! observer runs, not the value that write delivered. If an observer earlier
//! in the list writes the cell again, the nested write renders first and the
//! outer delivery renders the same, latest value once more; the tree never
//! settles on a value the cell no longer holds.
//!
//! # Binding State
//!
//! Each reactive slot owns a small record holding its live content, its
//! marker and its subscription. The observer closure shares that record,
//! and nothing else writes to it. The representation returned to the caller
//! is a snapshot taken at resolve time; it does not follow later writes.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::rendered::Rendered;
use super::slot::{Slot, SlotSource};
use crate::reactive::Subscription;
use crate::tree::RenderTarget;

/// Where new nodes go inside a container.
#[derive(Debug)]
enum Position<'a, N> {
    /// At the end.
    Append,

    /// Directly before an existing child.
    Before(&'a N),
}

impl<N> Clone for Position<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for Position<'_, N> {}

/// Attached content, including the live bindings inside it.
enum Live<N> {
    Nothing,
    Node(N),
    Many(Vec<Live<N>>),
    Bound(Arc<Binding<N>>),
}

impl<N: Clone> Live<N> {
    fn snapshot(&self) -> Rendered<N> {
        match self {
            Live::Nothing => Rendered::Nothing,
            Live::Node(node) => Rendered::Node(node.clone()),
            Live::Many(items) => Rendered::Many(items.iter().map(Live::snapshot).collect()),
            Live::Bound(binding) => binding.state.lock().content.snapshot(),
        }
    }

    fn binding_count(&self) -> usize {
        match self {
            Live::Nothing | Live::Node(_) => 0,
            Live::Many(items) => items.iter().map(Live::binding_count).sum(),
            Live::Bound(binding) => 1 + binding.state.lock().content.binding_count(),
        }
    }
}

impl<N> Default for Live<N> {
    fn default() -> Self {
        Live::Nothing
    }
}

/// Per-attachment state of one reactive slot.
struct Binding<N> {
    source: u64,
    state: Mutex<BindingState<N>>,
}

struct BindingState<N> {
    /// What the slot currently shows.
    content: Live<N>,

    /// Anchor after the content; new content is inserted before it.
    marker: N,

    /// Taken when the binding is released.
    subscription: Option<Subscription>,

    released: bool,
}

/// Resolves slots against containers of a [`RenderTarget`].
pub struct Composer<R: RenderTarget> {
    target: Arc<R>,
}

impl<R: RenderTarget> Clone for Composer<R> {
    fn clone(&self) -> Self {
        Self {
            target: Arc::clone(&self.target),
        }
    }
}

impl<R: RenderTarget> Composer<R> {
    /// Create a composer rendering into `target`.
    pub fn new(target: Arc<R>) -> Self {
        Self { target }
    }

    /// The render target.
    pub fn target(&self) -> &Arc<R> {
        &self.target
    }

    /// Resolve `slot` into `container` and return what was attached.
    ///
    /// Live bindings created here stay subscribed for as long as their cells
    /// live: passing the result to [`Composer::remove`] detaches the nodes,
    /// but a binding's marker stays behind and its next write attaches new
    /// content again. Use [`Composer::attach`] and [`Attached::release`] to
    /// take content down for good.
    pub fn resolve(&self, container: &R::Node, slot: impl Into<Slot<R::Node>>) -> Rendered<R::Node> {
        self.attach(container, slot).into_rendered()
    }

    /// Resolve `slot` into `container`, keeping ownership of its bindings.
    pub fn attach(&self, container: &R::Node, slot: impl Into<Slot<R::Node>>) -> Attached<R> {
        let live = self.build(container, slot.into(), Position::Append);
        let rendered = live.snapshot();
        Attached {
            composer: self.clone(),
            live,
            rendered,
        }
    }

    /// Detach every node of `rendered` from its parent.
    ///
    /// Only the nodes named by the representation are touched; bindings
    /// inside it stay subscribed and their markers stay in place. The nodes
    /// are not disposed and may be attached again.
    pub fn remove(&self, rendered: &Rendered<R::Node>) {
        match rendered {
            Rendered::Nothing => {}
            Rendered::Node(node) => self.target.detach(node),
            Rendered::Many(items) => {
                for item in items {
                    self.remove(item);
                }
            }
        }
    }

    /// Hand the bindings of `attached` to `node`.
    ///
    /// They are released when the render target disposes `node`, for
    /// example when a binding replaces content that contains it.
    pub fn adopt(&self, node: &R::Node, attached: Attached<R>) {
        if attached.binding_count() == 0 {
            return;
        }
        let target = Arc::downgrade(&self.target);
        let live = attached.live;
        self.target.on_dispose(
            node,
            Box::new(move || {
                if let Some(target) = target.upgrade() {
                    Composer::new(target).teardown(live);
                }
            }),
        );
    }

    fn place(&self, container: &R::Node, node: &R::Node, at: Position<'_, R::Node>) {
        match at {
            Position::Append => self.target.append(container, node),
            Position::Before(anchor) => self.target.insert_before(container, node, anchor),
        }
    }

    fn build(
        &self,
        container: &R::Node,
        slot: Slot<R::Node>,
        at: Position<'_, R::Node>,
    ) -> Live<R::Node> {
        match slot {
            Slot::Absent => Live::Nothing,
            Slot::Many(items) => Live::Many(
                items
                    .into_iter()
                    .map(|item| self.build(container, item, at))
                    .collect(),
            ),
            Slot::Node(node) => {
                self.place(container, &node, at);
                Live::Node(node)
            }
            Slot::Text(text) => {
                let leaf = self.target.create_leaf(&text);
                self.place(container, &leaf, at);
                Live::Node(leaf)
            }
            Slot::Reactive(source) => self.bind(container, source, at),
        }
    }

    fn bind(
        &self,
        container: &R::Node,
        source: Arc<dyn SlotSource<R::Node>>,
        at: Position<'_, R::Node>,
    ) -> Live<R::Node> {
        let content = self.build(container, source.current_slot(), at);
        let marker = self.target.create_marker();
        self.place(container, &marker, at);

        let binding = Arc::new(Binding {
            source: source.source_id(),
            state: Mutex::new(BindingState {
                content,
                marker,
                subscription: None,
                released: false,
            }),
        });

        let composer = self.clone();
        let owner = container.clone();
        let observed = Arc::clone(&binding);
        let subscription = source.subscribe_slot(Box::new(move |slot| {
            composer.rebind(&owner, &observed, slot);
        }));
        binding.state.lock().subscription = Some(subscription);

        debug!(source = binding.source, "binding established");
        Live::Bound(binding)
    }

    fn rebind(&self, container: &R::Node, binding: &Binding<R::Node>, slot: Slot<R::Node>) {
        let mut state = binding.state.lock();
        if state.released {
            return;
        }
        trace!(source = binding.source, "binding updated");

        let previous = std::mem::take(&mut state.content);
        self.teardown(previous);

        let marker = state.marker.clone();
        state.content = self.build(container, slot, Position::Before(&marker));
    }

    fn teardown(&self, live: Live<R::Node>) {
        match live {
            Live::Nothing => {}
            Live::Node(node) => self.target.dispose(&node),
            Live::Many(items) => {
                for item in items {
                    self.teardown(item);
                }
            }
            Live::Bound(binding) => self.release(&binding),
        }
    }

    fn release(&self, binding: &Binding<R::Node>) {
        let (content, subscription, marker) = {
            let mut state = binding.state.lock();
            if state.released {
                return;
            }
            state.released = true;
            (
                std::mem::take(&mut state.content),
                state.subscription.take(),
                state.marker.clone(),
            )
        };

        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
        self.teardown(content);
        self.target.dispose(&marker);
        debug!(source = binding.source, "binding released");
    }
}

/// Content attached by [`Composer::attach`].
///
/// Dropping it leaves the content and its bindings in place; call
/// [`Attached::release`] to take both down.
pub struct Attached<R: RenderTarget> {
    composer: Composer<R>,
    live: Live<R::Node>,
    rendered: Rendered<R::Node>,
}

impl<R: RenderTarget> Attached<R> {
    /// The representation as of attach time.
    pub fn rendered(&self) -> &Rendered<R::Node> {
        &self.rendered
    }

    /// Number of live bindings owned by this attachment, nested ones included.
    pub fn binding_count(&self) -> usize {
        self.live.binding_count()
    }

    /// Give up control of the bindings and keep the representation.
    pub fn into_rendered(self) -> Rendered<R::Node> {
        self.rendered
    }

    /// Dispose the current content and unsubscribe every binding inside it.
    pub fn release(self) {
        self.composer.teardown(self.live);
    }
}

impl<R: RenderTarget> std::fmt::Debug for Attached<R>
where
    R::Node: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attached")
            .field("rendered", &self.rendered)
            .field("binding_count", &self.binding_count())
            .finish()
    }
}
