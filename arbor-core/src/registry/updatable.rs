//! Updatable regions.
//!
//! An updatable is a div whose content is produced by a render function and
//! can be produced again, with new arguments, by name. Re-rendering disposes
//! everything the previous render attached, which releases its live
//! bindings, those inside elements included.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::compose::{Attached, Composer, Slot};
use crate::elements::Attributes;
use crate::error::{ArborError, Result};
use crate::tree::ElementTarget;

type RenderFn<N> = Arc<dyn Fn(&Attributes) -> Slot<N> + Send + Sync>;

struct Region<R: ElementTarget> {
    container: R::Node,
    render: RenderFn<R::Node>,
    content: Option<Attached<R>>,
}

/// Maps names to re-renderable regions.
pub struct UpdatableRegistry<R: ElementTarget> {
    composer: Composer<R>,
    regions: Mutex<IndexMap<String, Region<R>>>,
}

impl<R: ElementTarget> UpdatableRegistry<R> {
    /// Create an empty registry rendering through `composer`.
    pub fn new(composer: Composer<R>) -> Self {
        Self {
            composer,
            regions: Mutex::new(IndexMap::new()),
        }
    }

    /// Create a region rendered by `render`, render it once with
    /// `initial_args`, and register it under `name`.
    ///
    /// Returns the region's div, detached, for use as a pre-built node.
    pub fn updatable<F>(&self, name: impl Into<String>, render: F, initial_args: &Attributes) -> R::Node
    where
        F: Fn(&Attributes) -> Slot<R::Node> + Send + Sync + 'static,
    {
        let name = name.into();
        let container = self.composer.target().create_element("div");
        let render: RenderFn<R::Node> = Arc::new(render);

        let content = self.composer.attach(&container, render(initial_args));

        let previous = self.regions.lock().insert(
            name.clone(),
            Region {
                container: container.clone(),
                render,
                content: Some(content),
            },
        );
        if previous.is_some() {
            debug!(updatable = %name, "updatable replaced");
        }
        info!(updatable = %name, "updatable registered");
        container
    }

    /// Re-render the region registered under `name` with `args`.
    pub fn update(&self, name: &str, args: &Attributes) -> Result<()> {
        // The render function runs unlocked: it may create or update other
        // regions.
        let (container, render, previous) = {
            let mut regions = self.regions.lock();
            let Some(region) = regions.get_mut(name) else {
                warn!(updatable = name, "updatable not found");
                return Err(ArborError::UpdatableNotFound(name.to_string()));
            };
            (
                region.container.clone(),
                Arc::clone(&region.render),
                region.content.take(),
            )
        };

        if let Some(previous) = previous {
            previous.release();
        }
        let content = self.composer.attach(&container, render(args));

        if let Some(region) = self.regions.lock().get_mut(name) {
            region.content = Some(content);
        }
        debug!(updatable = name, "updatable re-rendered");
        Ok(())
    }

    /// Re-render every region with empty arguments, in registration order.
    pub fn update_all(&self) -> Result<()> {
        let names: Vec<String> = self.regions.lock().keys().cloned().collect();
        let args = Attributes::new();
        for name in names {
            self.update(&name, &args)?;
        }
        Ok(())
    }

    /// Check if a region is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.regions.lock().contains_key(name)
    }

    /// Number of registered regions.
    pub fn len(&self) -> usize {
        self.regions.lock().len()
    }

    /// Check if no region is registered.
    pub fn is_empty(&self) -> bool {
        self.regions.lock().is_empty()
    }
}
