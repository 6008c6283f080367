//! Component registry.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{info, warn};

use crate::compose::Slot;
use crate::elements::Attributes;
use crate::error::{ArborError, Result};

/// A registered render function.
pub type ComponentFn<N> = Arc<dyn Fn(&Attributes) -> Slot<N> + Send + Sync>;

/// Maps component names to render functions.
pub struct ComponentRegistry<N> {
    components: DashMap<String, ComponentFn<N>>,
}

impl<N> ComponentRegistry<N> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            components: DashMap::new(),
        }
    }

    /// Register `render` under `name`, replacing any earlier component.
    pub fn register<F>(&self, name: impl Into<String>, render: F)
    where
        F: Fn(&Attributes) -> Slot<N> + Send + Sync + 'static,
    {
        let name = name.into();
        info!(component = %name, "component registered");
        self.components.insert(name, Arc::new(render));
    }

    /// Render the component registered under `name`.
    pub fn render(&self, name: &str, args: &Attributes) -> Result<Slot<N>> {
        // Clone out of the map first: the component may register others.
        let render = match self.components.get(name) {
            Some(entry) => Arc::clone(entry.value()),
            None => {
                warn!(component = name, "component not found");
                return Err(ArborError::ComponentNotFound(name.to_string()));
            }
        };
        Ok(render(args))
    }

    /// Check if a component is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if no component is registered.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl<N> Default for ComponentRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::attributes;

    fn text_of<N>(slot: &Slot<N>) -> Option<&str> {
        match slot {
            Slot::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    #[test]
    fn render_passes_arguments() {
        let registry: ComponentRegistry<u32> = ComponentRegistry::new();
        registry.register("greeting", |args: &Attributes| {
            let name = args.get("name").map(String::as_str).unwrap_or("stranger");
            Slot::text(format!("hello {name}"))
        });

        let slot = registry.render("greeting", &attributes([("name", "fiona")])).unwrap();
        assert_eq!(text_of(&slot), Some("hello fiona"));

        let slot = registry.render("greeting", &Attributes::new()).unwrap();
        assert_eq!(text_of(&slot), Some("hello stranger"));
    }

    #[test]
    fn missing_component_is_an_error() {
        let registry: ComponentRegistry<u32> = ComponentRegistry::new();
        let err = registry.render("donkey", &Attributes::new()).unwrap_err();
        assert!(matches!(err, ArborError::ComponentNotFound(name) if name == "donkey"));
    }

    #[test]
    fn register_overwrites() {
        let registry: ComponentRegistry<u32> = ComponentRegistry::new();
        registry.register("c", |_: &Attributes| Slot::text("old"));
        registry.register("c", |_: &Attributes| Slot::text("new"));

        assert_eq!(registry.len(), 1);
        let slot = registry.render("c", &Attributes::new()).unwrap();
        assert_eq!(text_of(&slot), Some("new"));
    }

    #[test]
    fn component_may_register_another() {
        let registry: Arc<ComponentRegistry<u32>> = Arc::new(ComponentRegistry::new());
        let inner = Arc::clone(&registry);
        registry.register("outer", move |_: &Attributes| {
            inner.register("late", |_: &Attributes| Slot::text("late"));
            Slot::Absent
        });

        registry.render("outer", &Attributes::new()).unwrap();
        assert!(registry.contains("late"));
    }
}
