//! # Request Handle
//!
//! `Inertia` is the per-request orchestrator a handler talks to. The middleware
//! creates one per request, stores it in the request extensions, and reads it
//! back once the handler has returned. Handlers get it through the extractor:
//!
//! ```ignore
//! async fn dashboard(inertia: Inertia) -> Result<Response, ErrorResponse> {
//!     inertia.render("Dashboard", Props::new().with("stats", json!(42))).await
//! }
//! ```
//!
//! Everything read from the request (protocol headers, cookie flag) is fixed
//! at creation. Handler-mutable state sits behind locks or atomics,
//! since middleware and the handler may touch it concurrently.

use super::config::InertiaState;
use super::cookie::cookie_value;
use super::render::RenderContext;
use super::response::{ErrorResponse, location_response, page_html_response, page_json_response};
use super::session::Session;
use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Method};
use axum::response::Response;
use inertia_core::protocol::{
    HEADER_ERROR_BAG, HEADER_INERTIA, HEADER_PARTIAL_COMPONENT, HEADER_PARTIAL_DATA,
    HEADER_PARTIAL_EXCEPT, HEADER_RESET,
};
use inertia_core::{
    ErrorMessageMap, ErrorMessages, InertiaError, PageContext, PendingErrors, Prop, Props,
    ReloadRequest, SESSION_ERRORS_KEY, assemble_page, parse_session_errors, session_errors_value,
};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

// =============================================================================
// REQUEST STATE
// =============================================================================

struct RequestState {
    config: InertiaState,
    headers: HeaderMap,
    method: Method,
    path: String,
    url: String,
    version: RwLock<String>,
    is_inertia: bool,
    reload: ReloadRequest,
    error_bag: Option<String>,
    /// Clear-history cookie as received, if present.
    clear_history_cookie: Option<String>,

    shared: RwLock<Props>,
    errors: ErrorMessageMap,
    root_view: RwLock<String>,
    encrypt_history: AtomicBool,
    clear_history: AtomicBool,
    clear_history_pulled: AtomicBool,
    ssr_enabled: AtomicBool,
    session: tokio::sync::Mutex<Option<Session>>,
    set_cookies: Mutex<Vec<HeaderValue>>,
}

/// Request-scoped protocol handle.
#[derive(Clone)]
pub struct Inertia {
    state: Arc<RequestState>,
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

impl Inertia {
    /// Read the request once and build its handle.
    pub fn for_request(config: InertiaState, parts: &Parts) -> Self {
        let headers = &parts.headers;
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| &original.0)
            .unwrap_or(&parts.uri);

        let reload = ReloadRequest::from_header_values(
            header_str(headers, HEADER_PARTIAL_COMPONENT),
            header_str(headers, HEADER_PARTIAL_DATA),
            header_str(headers, HEADER_PARTIAL_EXCEPT),
            header_str(headers, HEADER_RESET),
        );

        let state = RequestState {
            headers: headers.clone(),
            method: parts.method.clone(),
            path: uri.path().to_string(),
            url: uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| uri.path().to_string()),
            version: RwLock::new(config.version.current()),
            is_inertia: header_str(headers, HEADER_INERTIA).is_some_and(|v| !v.is_empty()),
            reload,
            error_bag: header_str(headers, HEADER_ERROR_BAG)
                .filter(|bag| !bag.is_empty())
                .map(str::to_string),
            clear_history_cookie: cookie_value(headers, &config.clear_history_cookie),
            shared: RwLock::new(Props::new()),
            errors: ErrorMessageMap::new(),
            root_view: RwLock::new(config.root_view.clone()),
            encrypt_history: AtomicBool::new(config.encrypt_history),
            clear_history: AtomicBool::new(false),
            clear_history_pulled: AtomicBool::new(false),
            ssr_enabled: AtomicBool::new(config.ssr_enabled),
            session: tokio::sync::Mutex::new(None),
            set_cookies: Mutex::new(Vec::new()),
            config,
        };

        Self {
            state: Arc::new(state),
        }
    }

    // -------------------------------------------------------------------------
    // Request facts
    // -------------------------------------------------------------------------

    /// Whether the request carries the protocol marker.
    pub fn is_inertia_request(&self) -> bool {
        self.state.is_inertia
    }

    pub fn method(&self) -> &Method {
        &self.state.method
    }

    /// Request path, used as the full-reload target on a version mismatch.
    pub fn path(&self) -> &str {
        &self.state.path
    }

    /// Request path and query, as sent in the page.
    pub fn url(&self) -> &str {
        &self.state.url
    }

    /// Asset version of the page this request renders.
    pub fn version(&self) -> String {
        self.state
            .version
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Override the page version for this request only.
    ///
    /// The stale-version check has already run against the configured
    /// version by the time a handler calls this, so the override only
    /// changes the `version` the rendered page carries.
    pub fn set_version(&self, version: impl Into<String>) {
        *self.state.version.write().unwrap_or_else(PoisonError::into_inner) = version.into();
    }

    /// Partial-reload state.
    pub fn reload(&self) -> &ReloadRequest {
        &self.state.reload
    }

    // -------------------------------------------------------------------------
    // Shared props
    // -------------------------------------------------------------------------

    /// Share one prop with every render of this request.
    pub fn share(&self, key: impl Into<String>, prop: impl Into<Prop>) {
        self.state
            .shared
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, prop);
    }

    /// Share several props; existing keys are overwritten.
    pub fn share_props(&self, props: Props) {
        self.state
            .shared
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(props);
    }

    /// Snapshot of the shared props.
    pub fn shared(&self) -> Props {
        self.state
            .shared
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop every shared prop.
    pub fn flush_shared(&self) {
        *self.state.shared.write().unwrap_or_else(PoisonError::into_inner) = Props::new();
    }

    // -------------------------------------------------------------------------
    // View, history and SSR switches
    // -------------------------------------------------------------------------

    pub fn set_root_view(&self, name: impl Into<String>) {
        *self.state.root_view.write().unwrap_or_else(PoisonError::into_inner) = name.into();
    }

    pub fn root_view(&self) -> String {
        self.state
            .root_view
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn encrypt_history(&self, encrypt: bool) {
        self.state.encrypt_history.store(encrypt, Ordering::SeqCst);
    }

    /// Ask the client to purge its history. Survives one redirect.
    pub fn clear_history(&self) {
        self.state.clear_history.store(true, Ordering::SeqCst);
    }

    pub fn enable_ssr(&self) {
        self.state.ssr_enabled.store(true, Ordering::SeqCst);
    }

    pub fn disable_ssr(&self) {
        self.state.ssr_enabled.store(false, Ordering::SeqCst);
    }

    pub fn is_ssr_enabled(&self) -> bool {
        self.state.ssr_enabled.load(Ordering::SeqCst)
    }

    // -------------------------------------------------------------------------
    // Error messages
    // -------------------------------------------------------------------------

    /// Error messages collected for this request.
    pub fn errors(&self) -> &ErrorMessageMap {
        &self.state.errors
    }

    pub fn update_error_messages<I, K, V>(&self, messages: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.state.errors.update(messages);
    }

    /// Record messages and persist them so they survive a redirect.
    pub async fn update_error_messages_with_session<I, K, V>(
        &self,
        messages: I,
    ) -> Result<(), InertiaError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.update_error_messages(messages);
        self.sync_error_messages_session().await
    }

    /// Write the current messages into the session and save it.
    pub async fn sync_error_messages_session(&self) -> Result<(), InertiaError> {
        let mut session = self.session().await?;
        if self.state.errors.is_empty() {
            return Ok(());
        }
        session.insert(
            SESSION_ERRORS_KEY,
            session_errors_value(&self.state.errors.to_map()),
        );
        self.save_session(session).await
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    /// The request's session, loaded once and cached.
    pub async fn session(&self) -> Result<Session, InertiaError> {
        let store = self
            .state
            .config
            .session_store
            .as_ref()
            .ok_or(InertiaError::SessionUnavailable)?;

        let mut cached = self.state.session.lock().await;
        if let Some(session) = cached.as_ref() {
            return Ok(session.clone());
        }
        let loaded = store.load(&self.state.headers).await?;
        *cached = Some(loaded.clone());
        Ok(loaded)
    }

    /// Persist `session` and queue its cookie for the response.
    pub async fn save_session(&self, mut session: Session) -> Result<(), InertiaError> {
        let store = self
            .state
            .config
            .session_store
            .as_ref()
            .ok_or(InertiaError::SessionUnavailable)?;

        let mut cached = self.state.session.lock().await;
        if let Some(cookie) = store.save(&session).await? {
            self.queue_cookie(cookie);
        }
        // an empty session is not stored, so it still owes its cookie
        if !session.values().is_empty() {
            session.mark_saved();
        }
        *cached = Some(session);
        Ok(())
    }

    /// Take the session error bag, if any. Reading consumes it.
    async fn pull_session_errors(&self) -> Result<Option<ErrorMessages>, InertiaError> {
        if self.state.config.session_store.is_none() {
            return Ok(None);
        }
        let mut session = self.session().await?;
        let Some(value) = session.remove(SESSION_ERRORS_KEY) else {
            return Ok(None);
        };
        let errors = parse_session_errors(&value)?;
        self.save_session(session).await?;
        Ok(Some(errors))
    }

    // -------------------------------------------------------------------------
    // Responses
    // -------------------------------------------------------------------------

    /// Redirect to an external URL (or any non-Inertia page).
    pub fn location(&self, url: &str) -> Response {
        location_response(self.state.is_inertia, url)
    }

    /// Render `component` with `props`.
    pub async fn render(&self, component: &str, props: Props) -> Result<Response, ErrorResponse> {
        self.render_with_view_data(component, props, Map::new())
            .await
    }

    /// Render with extra data for the root view.
    ///
    /// Meant to be called at most once per request: it consumes pending error
    /// messages and the clear-history flag.
    pub async fn render_with_view_data(
        &self,
        component: &str,
        props: Props,
        view_data: Map<String, Value>,
    ) -> Result<Response, ErrorResponse> {
        let session_errors = self.pull_session_errors().await?;
        let clear_history = self.pull_clear_history();
        let shared = self.shared();

        let page = assemble_page(
            component,
            &shared,
            props,
            PendingErrors {
                session: session_errors,
                request: &self.state.errors,
                bag: self.state.error_bag.as_deref(),
            },
            PageContext {
                reload: &self.state.reload,
                url: self.state.url.clone(),
                version: self.version(),
                encrypt_history: self.state.encrypt_history.load(Ordering::SeqCst),
                clear_history,
            },
        )?;

        if self.state.is_inertia {
            tracing::debug!(component, url = %page.url, "rendering page as JSON");
            return Ok(page_json_response(&page)?);
        }

        let renderer = self
            .state
            .config
            .renderer
            .clone()
            .ok_or(InertiaError::RendererMissing)?;

        let ssr = match (&self.state.config.ssr, self.is_ssr_enabled()) {
            (Some(engine), true) => Some(engine.render(&page).await?),
            _ => None,
        };

        let view = self.root_view();
        let html = renderer.render(&RenderContext {
            page: &page,
            view: &view,
            view_data: &view_data,
            ssr: ssr.as_ref(),
        })?;

        tracing::debug!(component, view = %view, ssr = ssr.is_some(), "rendering page as HTML");
        Ok(page_html_response(html))
    }

    // -------------------------------------------------------------------------
    // Commit-time state
    // -------------------------------------------------------------------------

    /// Resolve the one-shot clear-history flag for a page and mark it consumed.
    fn pull_clear_history(&self) -> bool {
        self.state.clear_history_pulled.store(true, Ordering::SeqCst);
        let requested = self.state.clear_history.swap(false, Ordering::SeqCst);
        requested || self.clear_history_cookie_set()
    }

    fn clear_history_cookie_set(&self) -> bool {
        self.state.clear_history_cookie.as_deref() == Some("true")
    }

    /// Clear-history state the finaliser needs once the handler has returned.
    pub(crate) fn clear_history_outcome(&self) -> ClearHistoryOutcome {
        let pulled = self.state.clear_history_pulled.load(Ordering::SeqCst);
        ClearHistoryOutcome {
            pending: self.state.clear_history.load(Ordering::SeqCst)
                || (!pulled && self.clear_history_cookie_set()),
            cookie_present: self.state.clear_history_cookie.is_some(),
            cookie_name: self.state.config.clear_history_cookie.clone(),
        }
    }

    pub(crate) fn queue_cookie(&self, cookie: HeaderValue) {
        self.state
            .set_cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(cookie);
    }

    pub(crate) fn take_cookies(&self) -> Vec<HeaderValue> {
        std::mem::take(
            &mut *self
                .state
                .set_cookies
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

/// What to do with the clear-history cookie at commit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClearHistoryOutcome {
    /// A clear request no page has delivered yet.
    pub pending: bool,
    /// The request carried the cookie.
    pub cookie_present: bool,
    pub cookie_name: String,
}

// =============================================================================
// EXTRACTOR
// =============================================================================

impl<S> FromRequestParts<S> for Inertia
where
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Inertia>()
            .cloned()
            .ok_or(ErrorResponse(InertiaError::NotInitialized))
    }
}

// =============================================================================
// TESTS
// =============================================================================
