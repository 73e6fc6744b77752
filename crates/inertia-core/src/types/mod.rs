//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the engine:
//! - The boxed error type handed back by prop callbacks (`BoxError`)
//! - The property set type (`Props`)
//! - The error taxonomy (`InertiaError`)
//!
//! ## Determinism Guarantees
//!
//! `Props` is a `BTreeMap`, so every key list derived from it (rendered props,
//! merge lists, defer groups) comes out in the same order for the same input.

use crate::prop::Prop;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// ALIASES
// =============================================================================

/// Error type returned by prop callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// PROPS
// =============================================================================

/// A named set of response properties.
///
/// Keys are prop names as seen by the client, values are unresolved variants.
#[derive(Debug, Clone, Default)]
pub struct Props(BTreeMap<String, Prop>);

impl Props {
    /// Create an empty property set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, prop: impl Into<Prop>) -> Self {
        self.insert(key, prop);
        self
    }

    /// Insert a prop, returning the previous one under that key.
    pub fn insert(&mut self, key: impl Into<String>, prop: impl Into<Prop>) -> Option<Prop> {
        self.0.insert(key.into(), prop.into())
    }

    /// Remove a prop by key.
    pub fn remove(&mut self, key: &str) -> Option<Prop> {
        self.0.remove(key)
    }

    /// Look up a prop by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Prop> {
        self.0.get(key)
    }

    /// Check whether a key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of props.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no props.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, prop)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Prop)> {
        self.0.iter()
    }

    /// Iterate over keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Keep only the entries for which `f` returns true.
    pub fn retain(&mut self, mut f: impl FnMut(&str, &Prop) -> bool) {
        self.0.retain(|k, v| f(k, v));
    }

    /// Overlay `other` on top of `self`. Keys in `other` win.
    pub fn extend(&mut self, other: Props) {
        self.0.extend(other.0);
    }

    /// Build plain-value props from any serializable struct or map.
    ///
    /// The value must serialize to a JSON object; each top-level field becomes
    /// one `Prop::Value`.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, InertiaError> {
        match serde_json::to_value(value) {
            Ok(serde_json::Value::Object(map)) => Ok(map.into_iter().collect()),
            Ok(serde_json::Value::Null) => Ok(Self::new()),
            Ok(other) => Err(InertiaError::Serialization(format!(
                "props must serialize to a JSON object, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(InertiaError::Serialization(e.to_string())),
        }
    }
}

impl<K: Into<String>, P: Into<Prop>> FromIterator<(K, P)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Props {
    type Item = (String, Prop);
    type IntoIter = std::collections::btree_map::IntoIter<String, Prop>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while resolving and emitting a page.
///
/// None of these are process-fatal; every one is handed back to the caller.
/// A version mismatch is not an error, it is a deliberate short-circuit response.
#[derive(Debug, Error)]
pub enum InertiaError {
    /// A prop callback failed. The whole render is aborted.
    #[error("failed to evaluate prop '{key}': {source}")]
    Evaluation {
        /// Top-level prop key whose evaluation failed.
        key: String,
        /// The callback's error.
        #[source]
        source: BoxError,
    },

    /// The request-scoped handle is missing: the middleware was not installed.
    #[error("inertia is not initialized for this request")]
    NotInitialized,

    /// An HTML response was required but no renderer is configured.
    #[error("renderer not registered")]
    RendererMissing,

    /// A session-dependent operation ran without a session store.
    #[error("session store not registered")]
    SessionUnavailable,

    /// The session store failed to load or save.
    #[error("session error: {0}")]
    Session(String),

    /// A value read back from the session does not match its schema.
    #[error("invalid session value: {0}")]
    InvalidSessionValue(String),

    /// The external SSR call failed or returned a non-success status.
    #[error("ssr transport error: {0}")]
    SsrTransport(String),

    /// The named root view is not known to the renderer.
    #[error("template error: {0}")]
    Template(String),

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

impl InertiaError {
    /// Wrap a callback failure for the given prop key.
    pub fn evaluation(key: impl Into<String>, source: BoxError) -> Self {
        Self::Evaluation {
            key: key.into(),
            source,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
