//! Named Registries
//!
//! Explicit registry objects for reusable content. Each registry is owned by
//! the caller and passed by reference to whatever needs a lookup; there is no
//! process-wide instance.
//!
//! - [`ComponentRegistry`]: name to render function, producing a slot.
//! - [`UpdatableRegistry`]: name to a region that can be re-rendered with new
//!   arguments.
//!
//! Registering a name twice overwrites the earlier entry. Nothing is ever
//! removed.

mod component;
mod updatable;

pub use component::{ComponentFn, ComponentRegistry};
pub use updatable::UpdatableRegistry;
