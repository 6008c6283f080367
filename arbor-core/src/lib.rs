//! Arbor Core
//!
//! This crate provides the core runtime for the Arbor reactive tree
//! composition layer. It implements:
//!
//! - A reactive cell primitive with ordered, synchronous notification
//! - A recursive composer that turns declarative slots into attached nodes
//!   and re-renders exactly the subtree a cell produced when it changes
//! - A mount entry point, element factories and named registries on top
//!
//! There is no virtual DOM and no diff pass. Every node operation goes
//! through a [`RenderTarget`](tree::RenderTarget) supplied by the caller.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: cells and subscriptions
//! - `compose`: slots, the composer, rendered representations, mount
//! - `tree`: the render target contract and an in-memory implementation
//! - `elements`: element constructors over the composer
//! - `registry`: component and updatable registries
//!
//! # Logging
//!
//! Diagnostics go through [`tracing`]. The crate never installs a
//! subscriber.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use arbor_core::compose::{Composer, Slot};
//! use arbor_core::reactive::Cell;
//! use arbor_core::tree::MemoryTarget;
//!
//! let target = Arc::new(MemoryTarget::new());
//! let composer = Composer::new(Arc::clone(&target));
//! let body = target.body();
//!
//! let count = Cell::new(1);
//! composer.resolve(&body, vec![Slot::text("a"), Slot::from(&count), Slot::text("b")]);
//! assert_eq!(target.texts(&body), vec!["a", "1", "b"]);
//!
//! count.set(2);
//! assert_eq!(target.texts(&body), vec!["a", "2", "b"]);
//! ```

pub mod compose;
pub mod config;
pub mod elements;
pub mod error;
pub mod reactive;
pub mod registry;
pub mod tree;

pub use compose::{Attached, Composer, Mount, Rendered, Slot, SlotSource};
pub use config::MountConfig;
pub use error::{ArborError, Result};
pub use reactive::{Cell, Subscription};
pub use tree::{ElementTarget, RenderTarget};
