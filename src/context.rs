//! Execution contexts bound to listeners
//!
//! A context is a flat mapping from string keys to arbitrary JSON values.
//! Contexts are combined with a one-level shallow merge and never mutated
//! in place: every merge produces a fresh value.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A listener execution context (string key → arbitrary value)
pub type Context = Map<String, Value>;

/// Unique identifier for an adapter instance
///
/// Serializes as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdapterId(String);

impl AdapterId {
    /// Create a new random AdapterId (UUID-based)
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create an AdapterId from a string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AdapterId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AdapterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AdapterId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The context a registered listener runs with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ListenerContext {
    /// A merged context mapping
    Values(Context),
    /// No context was configured anywhere; the listener runs against the adapter itself
    Adapter(AdapterId),
}

impl ListenerContext {
    /// The context mapping, if this is not the adapter fallback.
    pub fn values(&self) -> Option<&Context> {
        match self {
            Self::Values(ctx) => Some(ctx),
            Self::Adapter(_) => None,
        }
    }

    /// Look up a single context key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values().and_then(|ctx| ctx.get(key))
    }

    pub fn is_adapter(&self) -> bool {
        matches!(self, Self::Adapter(_))
    }
}

/// Combine two optional contexts one level deep.
///
/// Overlay keys win on collision. Nested values are replaced wholesale.
/// Returns `None` only when neither side supplies a context.
pub fn shallow_merge(base: Option<&Context>, overlay: Option<&Context>) -> Option<Context> {
    match (base, overlay) {
        (None, None) => None,
        (Some(base), None) => Some(base.clone()),
        (None, Some(overlay)) => Some(overlay.clone()),
        (Some(base), Some(overlay)) => {
            let mut merged = base.clone();
            for (key, value) in overlay {
                merged.insert(key.clone(), value.clone());
            }
            Some(merged)
        }
    }
}
