//! # Adapter Configuration
//!
//! `InertiaConfig` is built once at startup and shared by every request the
//! middleware sees.
//!
//! ```ignore
//! let config = InertiaConfig::new()
//!     .root_view("app.html")
//!     .version(VersionSource::fixed("1"))
//!     .renderer(ShellRenderer::new().with_template("app.html", SHELL))
//!     .share_with(|_parts| {
//!         Box::pin(async { Ok(Props::new().with("appName", json!("demo"))) })
//!     });
//! ```

use super::BoxFuture;
use super::render::{DEFAULT_ROOT_VIEW, Renderer};
use super::session::SessionStore;
use super::ssr::SsrEngine;
use axum::http::request::Parts;
use inertia_core::protocol::CLEAR_HISTORY_COOKIE;
use inertia_core::{InertiaError, Props, VersionSource};
use std::fmt;
use std::sync::Arc;

/// Computes props shared by every response, once per request.
///
/// An error fails the request before the handler runs.
pub type SharedDataFn = Arc<
    dyn for<'a> Fn(&'a Parts) -> BoxFuture<'a, Result<Props, InertiaError>> + Send + Sync,
>;

/// Middleware state.
pub type InertiaState = Arc<InertiaConfig>;

/// Adapter-wide settings and collaborators.
#[derive(Clone)]
pub struct InertiaConfig {
    pub(crate) root_view: String,
    pub(crate) version: VersionSource,
    pub(crate) renderer: Option<Arc<dyn Renderer>>,
    pub(crate) ssr: Option<Arc<dyn SsrEngine>>,
    pub(crate) ssr_enabled: bool,
    pub(crate) session_store: Option<Arc<dyn SessionStore>>,
    pub(crate) share: Option<SharedDataFn>,
    pub(crate) clear_history_cookie: String,
    pub(crate) encrypt_history: bool,
}

impl Default for InertiaConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl InertiaConfig {
    /// Defaults: root view `app.html`, version from the environment or
    /// startup time, no renderer, no SSR, no session store.
    pub fn new() -> Self {
        Self {
            root_view: DEFAULT_ROOT_VIEW.to_string(),
            version: VersionSource::default(),
            renderer: None,
            ssr: None,
            ssr_enabled: true,
            session_store: None,
            share: None,
            clear_history_cookie: CLEAR_HISTORY_COOKIE.to_string(),
            encrypt_history: false,
        }
    }

    #[must_use]
    pub fn root_view(mut self, name: impl Into<String>) -> Self {
        self.root_view = name.into();
        self
    }

    #[must_use]
    pub fn version(mut self, version: VersionSource) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Use `engine` for first visits while SSR is enabled for the request.
    #[must_use]
    pub fn ssr(mut self, engine: impl SsrEngine + 'static) -> Self {
        self.ssr = Some(Arc::new(engine));
        self
    }

    /// Initial per-request SSR switch. Handlers may still flip it.
    #[must_use]
    pub fn ssr_enabled(mut self, enabled: bool) -> Self {
        self.ssr_enabled = enabled;
        self
    }

    #[must_use]
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    /// Props shared by every response, computed before the handler runs.
    ///
    /// The hook may await (a user lookup, a session read). When it fails the
    /// middleware answers 500 and the handler is never called.
    #[must_use]
    pub fn share_with(
        mut self,
        f: impl for<'a> Fn(&'a Parts) -> BoxFuture<'a, Result<Props, InertiaError>>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.share = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn clear_history_cookie(mut self, name: impl Into<String>) -> Self {
        self.clear_history_cookie = name.into();
        self
    }

    /// Initial history-encryption flag for every page.
    #[must_use]
    pub fn encrypt_history(mut self, encrypt: bool) -> Self {
        self.encrypt_history = encrypt;
        self
    }

    /// Wrap into middleware state.
    pub fn into_state(self) -> InertiaState {
        Arc::new(self)
    }
}

impl fmt::Debug for InertiaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InertiaConfig")
            .field("root_view", &self.root_view)
            .field("version", &self.version)
            .field("renderer", &self.renderer.is_some())
            .field("ssr", &self.ssr.is_some())
            .field("ssr_enabled", &self.ssr_enabled)
            .field("session_store", &self.session_store.is_some())
            .field("share", &self.share.is_some())
            .field("clear_history_cookie", &self.clear_history_cookie)
            .field("encrypt_history", &self.encrypt_history)
            .finish()
    }
}
