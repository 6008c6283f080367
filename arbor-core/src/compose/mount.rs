//! Mount entry point.
//!
//! A [`Mount`] owns the root container of an application. The root is picked
//! once, on the first [`Mount::put`] (or an explicit [`Mount::initialize`]):
//! the configured `root_id` if there is one, otherwise the render target's
//! default container. After that the choice never changes.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::composer::Composer;
use super::rendered::Rendered;
use super::slot::Slot;
use crate::config::MountConfig;
use crate::error::{ArborError, Result};
use crate::tree::RenderTarget;

/// Attaches content to an application root.
pub struct Mount<R: RenderTarget> {
    composer: Composer<R>,
    config: Mutex<MountConfig>,
    root: Mutex<Option<R::Node>>,
}

impl<R: RenderTarget> Mount<R> {
    /// Create an uninitialized mount.
    pub fn new(target: Arc<R>, config: MountConfig) -> Self {
        Self {
            composer: Composer::new(target),
            config: Mutex::new(config),
            root: Mutex::new(None),
        }
    }

    /// The composer used for every attach.
    pub fn composer(&self) -> &Composer<R> {
        &self.composer
    }

    /// Set the identifier of the root container.
    ///
    /// Has no effect once the mount is initialized.
    pub fn set_root(&self, id: impl Into<String>) {
        let id = id.into();
        if self.is_initialized() {
            warn!(id = %id, "mount already initialized, root id ignored");
            return;
        }
        self.config.lock().root_id = Some(id);
    }

    /// Check if the root has been chosen.
    pub fn is_initialized(&self) -> bool {
        self.root.lock().is_some()
    }

    /// The root container, once initialized.
    pub fn root(&self) -> Option<R::Node> {
        self.root.lock().clone()
    }

    /// Choose the root container if that has not happened yet.
    ///
    /// Fails when the configured root id does not exist; the mount then
    /// stays uninitialized.
    pub fn initialize(&self) -> Result<R::Node> {
        let mut root = self.root.lock();
        if let Some(node) = root.as_ref() {
            return Ok(node.clone());
        }

        let target = self.composer.target();
        let node = match self.config.lock().root_id.as_deref() {
            Some(id) => match target.find_by_id(id) {
                Some(node) => node,
                None => {
                    warn!(id, "mount root not found");
                    return Err(ArborError::RootNotFound { id: id.to_string() });
                }
            },
            None => target.default_container(),
        };

        debug!("mount initialized");
        *root = Some(node.clone());
        Ok(node)
    }

    /// Attach `slot` to the root container, initializing first if needed.
    pub fn put(&self, slot: impl Into<Slot<R::Node>>) -> Result<Rendered<R::Node>> {
        let root = self.initialize()?;
        Ok(self.composer.resolve(&root, slot))
    }

    /// Attach `slot` to an explicit container. Does not touch the root.
    pub fn mount(&self, container: &R::Node, slot: impl Into<Slot<R::Node>>) -> Rendered<R::Node> {
        self.composer.resolve(container, slot)
    }
}
