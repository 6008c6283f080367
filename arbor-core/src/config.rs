//! Mount configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How [`Mount`](crate::compose::Mount) picks its root container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Identifier of the root container. When unset, the render target's
    /// default container is used.
    pub root_id: Option<String>,
}

impl MountConfig {
    /// Mount into the container with the given identifier.
    pub fn with_root_id(id: impl Into<String>) -> Self {
        Self {
            root_id: Some(id.into()),
        }
    }

    /// Parse a configuration from JSON, e.g. `{"root_id": "app"}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
