//! # Sessions
//!
//! The session collaborator: a `SessionStore` loads a `Session` for a request
//! and saves it back, returning the `Set-Cookie` header (if any) the response
//! must carry. `MemorySessionStore` keeps everything in process memory behind
//! a random session-id cookie and is meant for development and tests.

use super::BoxFuture;
use super::cookie::{SetCookie, cookie_value};
use axum::http::{HeaderMap, HeaderValue};
use inertia_core::InertiaError;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Default name of the session-id cookie.
pub const DEFAULT_SESSION_COOKIE: &str = "inertia_session";

// =============================================================================
// SESSION
// =============================================================================

/// A request's session: an id plus JSON values.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: String,
    values: Map<String, Value>,
    is_new: bool,
}

impl Session {
    /// A fresh, unsaved session with a random id.
    pub fn generate() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            values: Map::new(),
            is_new: true,
        }
    }

    /// A session restored from a store.
    pub fn restore(id: impl Into<String>, values: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            values,
            is_new: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// True until the session has been saved once.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Record that the store has persisted this session.
    pub fn mark_saved(&mut self) {
        self.is_new = false;
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Loads and saves sessions keyed by the incoming request.
pub trait SessionStore: Send + Sync {
    /// Load the session for a request, or start a new one.
    fn load<'a>(&'a self, headers: &'a HeaderMap) -> BoxFuture<'a, Result<Session, InertiaError>>;

    /// Persist a session. Returns the `Set-Cookie` value the response needs,
    /// if any.
    ///
    /// A session with no values may be discarded instead of stored.
    fn save<'a>(
        &'a self,
        session: &'a Session,
    ) -> BoxFuture<'a, Result<Option<HeaderValue>, InertiaError>>;
}

/// In-process session store.
///
/// Saving a session with no values evicts it. Sessions that keep values are
/// never expired, so the map is unbounded under real traffic.
#[derive(Debug)]
pub struct MemorySessionStore {
    cookie_name: String,
    sessions: RwLock<HashMap<String, Map<String, Value>>>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_COOKIE)
    }
}

impl MemorySessionStore {
    /// A store using `cookie_name` for the session id.
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn load<'a>(&'a self, headers: &'a HeaderMap) -> BoxFuture<'a, Result<Session, InertiaError>> {
        Box::pin(async move {
            let Some(id) = cookie_value(headers, &self.cookie_name) else {
                return Ok(Session::generate());
            };
            let sessions = self.sessions.read().await;
            match sessions.get(&id) {
                Some(values) => Ok(Session::restore(id, values.clone())),
                // unknown or expired id: never adopt a client-chosen id
                None => Ok(Session::generate()),
            }
        })
    }

    fn save<'a>(
        &'a self,
        session: &'a Session,
    ) -> BoxFuture<'a, Result<Option<HeaderValue>, InertiaError>> {
        Box::pin(async move {
            let mut sessions = self.sessions.write().await;
            if session.values().is_empty() {
                sessions.remove(session.id());
                return Ok(None);
            }
            sessions.insert(session.id().to_string(), session.values().clone());
            drop(sessions);

            if !session.is_new() {
                return Ok(None);
            }

            SetCookie::new(&self.cookie_name, session.id())
                .path("/")
                .http_only()
                .same_site_lax()
                .to_header_value()
                .map(Some)
                .ok_or_else(|| InertiaError::Session("session cookie is not a valid header".to_string()))
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
