//! # Validation Error Messages
//!
//! Field → message maps collected while handling a request, and the step of the
//! render pipeline that folds them into an `errors` prop.
//!
//! Messages come from two places: the request's own `ErrorMessageMap` and a bag
//! persisted in the session by an earlier request (typically a form POST that
//! redirected back). Both are consumed once read.

use crate::prop::Prop;
use crate::types::{InertiaError, Props};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Session key holding persisted error messages.
pub const SESSION_ERRORS_KEY: &str = "errors";

/// Prop key the resolved errors are rendered under.
pub const ERRORS_PROP: &str = "errors";

/// Field name → message.
pub type ErrorMessages = BTreeMap<String, String>;

// =============================================================================
// ERROR MESSAGE MAP
// =============================================================================

/// A lock-guarded map of error messages, shared by middleware and handler.
#[derive(Debug, Default)]
pub struct ErrorMessageMap {
    data: RwLock<ErrorMessages>,
}

impl ErrorMessageMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the message for one key.
    pub fn set(&self, key: impl Into<String>, message: impl Into<String>) -> &Self {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), message.into());
        self
    }

    /// Get the message for one key.
    pub fn get(&self, key: &str) -> Option<String> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Merge several messages in, overwriting existing keys.
    pub fn update<I, K, V>(&self, messages: I) -> &Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        for (key, message) in messages {
            data.insert(key.into(), message.into());
        }
        self
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.data.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True when there are no messages.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy out the current messages.
    pub fn to_map(&self) -> ErrorMessages {
        self.data.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Remove every message.
    pub fn clear(&self) -> &Self {
        self.data.write().unwrap_or_else(PoisonError::into_inner).clear();
        self
    }

    /// Take every message out, leaving the map empty.
    pub fn drain(&self) -> ErrorMessages {
        std::mem::take(&mut *self.data.write().unwrap_or_else(PoisonError::into_inner))
    }
}

// =============================================================================
// SESSION SCHEMA
// =============================================================================

/// Validate a session value as an error bag (string → string).
pub fn parse_session_errors(value: &Value) -> Result<ErrorMessages, InertiaError> {
    let Value::Object(map) = value else {
        return Err(InertiaError::InvalidSessionValue(format!(
            "session value '{}' is not an object",
            SESSION_ERRORS_KEY
        )));
    };

    map.iter()
        .map(|(key, message)| match message {
            Value::String(s) => Ok((key.clone(), s.clone())),
            _ => Err(InertiaError::InvalidSessionValue(format!(
                "session value '{}.{}' is not a string",
                SESSION_ERRORS_KEY, key
            ))),
        })
        .collect()
}

/// Encode an error bag for storage in the session.
pub fn session_errors_value(messages: &ErrorMessages) -> Value {
    Value::Object(
        messages
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Fold pending errors into `props` as an `Always` prop.
///
/// Session errors are applied first, request errors override them. The request
/// map is drained. With an error bag the messages nest under the bag name.
/// Nothing is inserted when there are no messages.
pub fn resolve_errors(
    props: &mut Props,
    session_errors: Option<ErrorMessages>,
    request_errors: &ErrorMessageMap,
    error_bag: Option<&str>,
) {
    let mut resolved = session_errors.unwrap_or_default();
    resolved.extend(request_errors.drain());

    if resolved.is_empty() {
        return;
    }

    let messages = session_errors_value(&resolved);
    let value = match error_bag.filter(|bag| !bag.is_empty()) {
        Some(bag) => {
            let mut nested = serde_json::Map::new();
            nested.insert(bag.to_string(), messages);
            Value::Object(nested)
        }
        None => messages,
    };
    props.insert(ERRORS_PROP, Prop::always(value));
}

// =============================================================================
// TESTS
// =============================================================================
