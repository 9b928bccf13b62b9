//! Adapter configuration
//!
//! `ComposeOptions` is both the adapter's stored configuration and the
//! overlay record accepted at composition time. Overlays are applied with
//! shallow-merge semantics, except that `context` is merged key by key
//! instead of being replaced.

use crate::context::{shallow_merge, Context};
use crate::emitter::EmitterRef;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors loading configuration from text
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON configuration error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML configuration error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Configuration record of an adapter, and the overlay shape used when composing.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ComposeOptions {
    /// Default execution context bound to registered listeners
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    /// The emitter whose methods are invoked. Injected, never deserialized.
    #[serde(skip)]
    pub emitter: Option<EmitterRef>,
    /// Keys not interpreted by the adapter, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComposeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    /// Set the context from a JSON value; non-object values are ignored.
    pub fn with_context_value(mut self, context: Value) -> Self {
        if let Value::Object(map) = context {
            self.context = Some(map);
        }
        self
    }

    pub fn with_emitter(mut self, emitter: EmitterRef) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Parse options from a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse options from a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Apply `overlay` on top of these options, producing a new value.
    ///
    /// Overlay keys win. `context` is merged one level deep; an absent
    /// overlay emitter keeps the current one.
    pub fn overlay(&self, overlay: &ComposeOptions) -> ComposeOptions {
        let mut extra = self.extra.clone();
        for (key, value) in &overlay.extra {
            extra.insert(key.clone(), value.clone());
        }

        ComposeOptions {
            context: shallow_merge(self.context.as_ref(), overlay.context.as_ref()),
            emitter: overlay.emitter.clone().or_else(|| self.emitter.clone()),
            extra,
        }
    }

    /// A data value supplied under the `emitter` key (e.g. from a config file).
    ///
    /// Such a value can never serve as an emitter.
    pub fn emitter_data(&self) -> Option<&Value> {
        self.extra.get("emitter")
    }
}

impl std::fmt::Debug for ComposeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposeOptions")
            .field("context", &self.context)
            .field("emitter", &self.emitter.as_ref().map(|_| "<emitter>"))
            .field("extra", &self.extra)
            .finish()
    }
}
