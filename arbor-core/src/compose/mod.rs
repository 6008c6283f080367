//! Tree Composition
//!
//! This module interprets [`Slot`]s against containers of a
//! [`RenderTarget`](crate::tree::RenderTarget) and keeps reactive slots in
//! sync with their cells.
//!
//! # Overview
//!
//! Data flows one way at render time (slot to attached nodes) and one way at
//! update time (cell write to observer to old content removed to new content
//! attached). There is no diff pass: a write replaces the whole subtree that
//! the written cell produced, and nothing else.
//!
//! # Entry Points
//!
//! - [`Composer::resolve`]: attach a slot and get its [`Rendered`]
//!   representation back.
//! - [`Composer::attach`]: the same, but keeps the [`Attached`] handle that
//!   can release every binding it created.
//! - [`Mount`]: attach to an application root chosen once from
//!   [`MountConfig`](crate::config::MountConfig).

mod composer;
mod mount;
mod rendered;
mod slot;

pub use composer::{Attached, Composer};
pub use mount::Mount;
pub use rendered::Rendered;
pub use slot::{Slot, SlotSource};
