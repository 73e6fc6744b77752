//! # inertia-axum
//!
//! Inertia protocol adapter for axum, built on `inertia-core`.
//!
//! ```ignore
//! let config = InertiaConfig::new()
//!     .version(VersionSource::fixed("1"))
//!     .renderer(ShellRenderer::new().with_template("app.html", SHELL));
//!
//! let app = Router::new()
//!     .route("/", get(home))
//!     .layer(axum::middleware::from_fn_with_state(config.into_state(), inertia_middleware));
//!
//! async fn home(inertia: Inertia) -> Result<Response, ErrorResponse> {
//!     inertia.render("Home", Props::new().with("greeting", json!("hi"))).await
//! }
//! ```
//!
//! ## Modules
//!
//! - `adapter` - middleware, request handle, collaborators
//! - `server` - the demo site
//! - `settings` - demo server settings

pub mod adapter;
pub mod server;
pub mod settings;

pub use adapter::{
    ErrorResponse, HttpSsrGateway, Inertia, InertiaConfig, InertiaState, MemorySessionStore,
    Renderer, Session, SessionStore, ShellRenderer, SsrEngine, SsrResponse, inertia_middleware,
    page, page_with_props,
};
pub use inertia_core::{Prop, Props, VersionSource};
