//! Cell Implementation
//!
//! A Cell is the reactive leaf primitive. It holds a value and an ordered
//! list of observers.
//!
//! # How Cells Work
//!
//! 1. Reading a cell returns the most recently written value (or the initial
//!    value if it has never been written).
//!
//! 2. Writing a cell replaces the value, then synchronously invokes every
//!    observer with the new value, in subscription order.
//!
//! 3. Observers stay registered until their [`Subscription`] is released.
//!
//! # Thread Safety
//!
//! Cells are `Send + Sync` when their value is. The value and the observer
//! list live behind `parking_lot` locks, and each write is serialized by a
//! re-entrant mutex so that replace-then-notify is atomic with respect to
//! writers on other threads. A write issued from inside an observer on the
//! same thread re-enters that mutex instead of deadlocking.
//!
//! # Re-entrancy
//!
//! Observers run against a snapshot of the observer list taken after the
//! value was replaced, with no lock held. An observer may write to this or
//! any other cell, and may subscribe or unsubscribe. Observers added during a
//! notification first run on the next write. Nothing guards against an
//! observer that keeps writing to its own cell; that recursion does not
//! terminate.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{ReentrantMutex, RwLock};
use smallvec::SmallVec;
use tracing::trace;

use super::subscriber::{SubscriberId, Subscription};

/// Counter for generating unique cell IDs.
static CELL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique cell ID.
fn next_cell_id() -> u64 {
    CELL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A registered observer.
struct Observer<T> {
    id: SubscriberId,
    /// Cleared on unsubscribe, so an in-flight snapshot skips it.
    active: AtomicBool,
    notify: Box<dyn Fn(&T) + Send + Sync>,
}

type ObserverList<T> = RwLock<Vec<Arc<Observer<T>>>>;

/// A reactive cell holding a value of type T.
///
/// Cloning a cell produces another handle to the same value and observers.
///
/// # Example
///
/// ```rust
/// use arbor_core::reactive::Cell;
///
/// let count = Cell::new(0);
/// let _subscription = count.subscribe(|value| println!("count is now {value}"));
///
/// count.set(5);
/// assert_eq!(count.get(), 5);
/// ```
pub struct Cell<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Unique identifier for this cell.
    id: u64,

    /// The current value.
    value: Arc<RwLock<T>>,

    /// Observers in subscription order.
    observers: Arc<ObserverList<T>>,

    /// Serializes writes across threads; re-entrant for nested writes.
    write_guard: Arc<ReentrantMutex<()>>,
}

impl<T> Cell<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new cell with the given initial value.
    ///
    /// Use `Cell<Option<T>>` (or [`Cell::default`]) for a cell that starts
    /// out absent.
    pub fn new(value: T) -> Self {
        Self {
            id: next_cell_id(),
            value: Arc::new(RwLock::new(value)),
            observers: Arc::new(RwLock::new(Vec::new())),
            write_guard: Arc::new(ReentrantMutex::new(())),
        }
    }

    /// Get the cell's unique ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get the current value.
    #[doc(alias = "read")]
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Run `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.read())
    }

    /// Replace the value and notify every observer with it.
    #[doc(alias = "write")]
    pub fn set(&self, value: T) {
        let _write = self.write_guard.lock();

        {
            let mut guard = self.value.write();
            *guard = value.clone();
        }

        let snapshot: SmallVec<[Arc<Observer<T>>; 4]> =
            self.observers.read().iter().cloned().collect();

        trace!(cell = self.id, observers = snapshot.len(), "cell written");

        for observer in snapshot {
            if observer.active.load(Ordering::SeqCst) {
                (observer.notify)(&value);
            }
        }
    }

    /// Update the value using a function of the current one.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let _write = self.write_guard.lock();
        let new_value = {
            let guard = self.value.read();
            f(&guard)
        };
        self.set(new_value);
    }

    /// Register an observer, invoked with the new value on every write.
    ///
    /// The observer is not invoked with the current value.
    pub fn subscribe<F>(&self, notify: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriberId::new();
        let observer = Arc::new(Observer {
            id,
            active: AtomicBool::new(true),
            notify: Box::new(notify),
        });

        self.observers.write().push(Arc::clone(&observer));

        // Weak on both sides: the observer may own whatever holds this
        // subscription.
        let observer: Weak<Observer<T>> = Arc::downgrade(&observer);
        let list: Weak<ObserverList<T>> = Arc::downgrade(&self.observers);
        let cell = self.id;
        Subscription::new(id, move || {
            if let Some(observer) = observer.upgrade() {
                observer.active.store(false, Ordering::SeqCst);
            }
            if let Some(list) = list.upgrade() {
                list.write().retain(|o| o.id != id);
                trace!(cell, subscriber = id.raw(), "observer released");
            }
        })
    }

    /// Register an observer that reads the value stored when it runs.
    ///
    /// Same ordering as [`Cell::subscribe`]. The difference shows when an
    /// earlier observer writes the cell again: a plain observer then sees the
    /// outer value after the nested one, this one sees the latest value both
    /// times.
    pub fn subscribe_latest<F>(&self, notify: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let value = Arc::downgrade(&self.value);
        self.subscribe(move |delivered| match value.upgrade() {
            Some(value) => {
                let current = value.read().clone();
                notify(&current);
            }
            None => notify(delivered),
        })
    }

    /// Get the number of registered observers.
    pub fn subscriber_count(&self) -> usize {
        self.observers.read().len()
    }
}

impl<T> Default for Cell<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Clone for Cell<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Arc::clone(&self.value),
            observers: Arc::clone(&self.observers),
            write_guard: Arc::clone(&self.write_guard),
        }
    }
}

impl<T> Debug for Cell<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("id", &self.id)
            .field("value", &*self.value.read())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn cell_get_and_set() {
        let cell = Cell::new(0);
        assert_eq!(cell.get(), 0);

        cell.set(42);
        assert_eq!(cell.get(), 42);
    }

    #[test]
    fn cell_starts_absent_by_default() {
        let cell: Cell<Option<String>> = Cell::default();
        assert_eq!(cell.get(), None);

        cell.set(Some("here".to_string()));
        assert_eq!(cell.get().as_deref(), Some("here"));
    }

    #[test]
    fn cell_update() {
        let cell = Cell::new(10);
        cell.update(|v| v + 5);
        assert_eq!(cell.get(), 15);
    }

    #[test]
    fn cell_notifies_with_new_value() {
        let cell = Cell::new(0);
        let seen = Arc::new(AtomicI32::new(-1));
        let seen_clone = seen.clone();

        let _sub = cell.subscribe(move |v| seen_clone.store(*v, Ordering::SeqCst));

        assert_eq!(seen.load(Ordering::SeqCst), -1);

        cell.set(7);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn cell_notifies_in_subscription_order() {
        let cell = Cell::new(0);
        let log = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let log = log.clone();
            let _ = cell.subscribe(move |v| log.lock().push((name, *v)));
        }

        cell.set(1);
        cell.set(2);

        assert_eq!(
            *log.lock(),
            vec![
                ("first", 1),
                ("second", 1),
                ("third", 1),
                ("first", 2),
                ("second", 2),
                ("third", 2),
            ]
        );
    }

    #[test]
    fn cell_unsubscribe() {
        let cell = Cell::new(0);
        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();

        let sub = cell.subscribe(move |_| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(cell.subscriber_count(), 1);

        cell.set(1);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);

        sub.unsubscribe();
        assert_eq!(cell.subscriber_count(), 0);

        cell.set(2);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn observer_released_mid_write_is_skipped() {
        let cell = Cell::new(0);
        let later_calls = Arc::new(AtomicI32::new(0));
        let pending: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let pending_clone = pending.clone();
        let _first = cell.subscribe(move |_| {
            if let Some(sub) = pending_clone.lock().take() {
                sub.unsubscribe();
            }
        });

        let later_clone = later_calls.clone();
        let second = cell.subscribe(move |_| {
            later_clone.fetch_add(1, Ordering::SeqCst);
        });
        *pending.lock() = Some(second);

        cell.set(1);
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
        assert_eq!(cell.subscriber_count(), 1);
    }

    #[test]
    fn observer_may_write_to_another_cell() {
        let source = Cell::new(1);
        let doubled = Cell::new(0);

        let target = doubled.clone();
        let _sub = source.subscribe(move |v| target.set(v * 2));

        source.set(21);
        assert_eq!(doubled.get(), 42);
    }

    #[test]
    fn observer_may_write_to_its_own_cell() {
        let cell = Cell::new(0);
        let writer = cell.clone();

        // Clamp anything above 10 back down; the nested write re-enters.
        let _sub = cell.subscribe(move |v| {
            if *v > 10 {
                writer.set(10);
            }
        });

        cell.set(50);
        assert_eq!(cell.get(), 10);
    }

    #[test]
    fn observer_added_during_write_runs_next_time() {
        let cell = Cell::new(0);
        let late_calls = Arc::new(AtomicI32::new(0));

        let handle = cell.clone();
        let late_clone = late_calls.clone();
        let added = Arc::new(AtomicBool::new(false));
        let _sub = cell.subscribe(move |_| {
            if !added.swap(true, Ordering::SeqCst) {
                let late = late_clone.clone();
                let _ = handle.subscribe(move |_| {
                    late.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        cell.set(1);
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);

        cell.set(2);
        assert_eq!(late_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscribe_latest_sees_nested_write() {
        let cell = Cell::new(0);
        let writer = cell.clone();
        let _clamp = cell.subscribe(move |v| {
            if *v > 10 {
                writer.set(10);
            }
        });

        let plain = Arc::new(Mutex::new(Vec::new()));
        let plain_clone = plain.clone();
        let _plain = cell.subscribe(move |v| plain_clone.lock().push(*v));

        let latest = Arc::new(Mutex::new(Vec::new()));
        let latest_clone = latest.clone();
        let _latest = cell.subscribe_latest(move |v| latest_clone.lock().push(*v));

        cell.set(50);
        assert_eq!(*plain.lock(), vec![10, 50]);
        assert_eq!(*latest.lock(), vec![10, 10]);
    }

    #[test]
    fn cell_clone_shares_state() {
        let cell1 = Cell::new(0);
        let cell2 = cell1.clone();

        cell1.set(42);
        assert_eq!(cell2.get(), 42);

        cell2.set(100);
        assert_eq!(cell1.get(), 100);
        assert_eq!(cell1.id(), cell2.id());
    }

    #[test]
    fn writes_from_threads_are_serialized() {
        let cell = Cell::new(0u32);
        let observed = Arc::new(Mutex::new(Vec::new()));

        let reader = cell.clone();
        let observed_clone = observed.clone();
        let _sub = cell.subscribe(move |v| {
            // Under the write guard, the stored value always equals the one
            // being delivered.
            observed_clone.lock().push((*v, reader.get()));
        });

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cell = cell.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        cell.set(t * 1000 + i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let observed = observed.lock();
        assert_eq!(observed.len(), 200);
        assert!(observed.iter().all(|(delivered, stored)| delivered == stored));
    }
}
