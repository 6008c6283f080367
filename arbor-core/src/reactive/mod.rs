//! Reactive Primitives
//!
//! This module implements the reactive leaf of the system: [`Cell`], a holder
//! of a single value that notifies its observers synchronously on every
//! write.
//!
//! # Concepts
//!
//! ## Cells
//!
//! A Cell is a container for mutable state. Writing a cell fans the new value
//! out to every observer, in the order they subscribed, before `set` returns.
//!
//! ## Subscriptions
//!
//! Subscribing returns a [`Subscription`]. Releasing it removes the observer;
//! dropping it leaves the observer registered for the cell's lifetime.
//!
//! Cells know nothing about rendering. The composer in
//! [`compose`](crate::compose) builds live subtrees on top of the subscribe
//! contract.

mod cell;
mod subscriber;

pub use cell::Cell;
pub use subscriber::{SubscriberId, Subscription};
