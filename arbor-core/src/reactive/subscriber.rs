//! Subscriber identity and subscription handles.
//!
//! Every observer registered on a [`Cell`](super::Cell) gets a
//! [`SubscriberId`] and hands a [`Subscription`] back to the caller. The
//! subscription is the only way to remove the observer again.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a subscriber.
///
/// Each observer gets a unique ID when it subscribes. The ID is what a
/// [`Subscription`] uses to find its observer again when it is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a registered observer.
///
/// Consumed by [`Subscription::unsubscribe`]. Dropping the handle without
/// unsubscribing leaves the observer registered for the lifetime of the cell.
pub struct Subscription {
    id: SubscriberId,
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Create a subscription that runs `release` when unsubscribed.
    pub fn new<F>(id: SubscriberId, release: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            id,
            release: Some(Box::new(release)),
        }
    }

    /// A subscription with nothing to release.
    pub fn inert() -> Self {
        Self {
            id: SubscriberId::new(),
            release: None,
        }
    }

    /// The ID of the observer this subscription refers to.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Remove the observer. It will not be invoked by any later write, and
    /// is skipped if a write currently in progress has not reached it yet.
    pub fn unsubscribe(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("releasable", &self.release.is_some())
            .finish()
    }
}
