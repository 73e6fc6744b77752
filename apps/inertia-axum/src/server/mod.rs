//! # Demo Server
//!
//! A small site wired through the adapter, one page per protocol feature.
//!
//! ## Routes
//!
//! - `GET /` - every eager prop kind, plus a lazy one
//! - `GET /users` - paginated merge prop, optional and deferred props
//! - `GET /users/create`, `POST /users` - validation errors across a redirect
//! - `DELETE /users/{id}` - 302 rewritten to 303
//! - `POST /logout` - history clearing across a redirect
//! - `GET /plain` - SSR switched off for one request
//! - `GET /docs` - external redirect
//! - `GET /about` - component-only route
//!
//! ## Environment
//!
//! - `INERTIA_*` settings, see [`crate::settings`]
//! - `INERTIA_LOG_FORMAT=json` for JSON logs

mod handlers;

pub use handlers::{User, UsersQuery};

use crate::adapter::{
    HttpSsrGateway, InertiaConfig, MemorySessionStore, ShellRenderer, inertia_middleware, page,
};
use crate::settings::ServerSettings;
use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use inertia_core::{InertiaError, Props};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

/// Root view used when no shell file is configured.
pub const BUILTIN_VIEW: &str = "app.html";

/// Built-in HTML shell.
pub const BUILTIN_SHELL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>@{title}</title>
    @inertiaHead
</head>
<body>
    @inertia
</body>
</html>
"#;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Demo data shared by every handler.
#[derive(Clone, Default)]
pub struct DemoState {
    pub users: Arc<RwLock<Vec<User>>>,
}

impl DemoState {
    /// State seeded with `count` users.
    pub fn seeded(count: u64) -> Self {
        let users = (1..=count)
            .map(|id| User {
                id,
                name: format!("User {}", id),
            })
            .collect();
        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Build the adapter configuration from server settings.
pub fn build_config(settings: &ServerSettings) -> Result<InertiaConfig, InertiaError> {
    let shell = ShellRenderer::new().container_id(settings.container_id.clone());
    let (renderer, root_view) = match &settings.root_view {
        Some(path) => {
            let view = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| BUILTIN_VIEW.to_string());
            (shell.with_template_file(path)?, view)
        }
        None => (
            shell.with_template(BUILTIN_VIEW, BUILTIN_SHELL),
            BUILTIN_VIEW.to_string(),
        ),
    };

    let mut config = InertiaConfig::new()
        .root_view(root_view)
        .version(settings.version_source()?)
        .renderer(renderer)
        .session_store(Arc::new(MemorySessionStore::default()))
        .encrypt_history(settings.encrypt_history)
        .share_with(|parts| {
            Box::pin(async move {
                Ok(Props::new()
                    .with("appName", json!("inertia-axum demo"))
                    .with("requestPath", json!(parts.uri.path())))
            })
        });

    match &settings.ssr_url {
        Some(url) => {
            tracing::info!("SSR enabled via {}", url);
            config = config.ssr(HttpSsrGateway::new(url.clone(), settings.ssr_timeout())?);
        }
        None => tracing::info!("SSR disabled"),
    }

    Ok(config)
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the demo router.
pub fn create_router(config: InertiaConfig, state: DemoState) -> Router {
    let routes = Router::new()
        .route("/", get(handlers::home_handler))
        .route("/users", get(handlers::users_handler).post(handlers::store_user_handler))
        .route("/users/create", get(handlers::create_user_handler))
        .route("/users/{id}", delete(handlers::delete_user_handler))
        .route("/logout", post(handlers::logout_handler))
        .route("/plain", get(handlers::plain_handler))
        .route("/docs", get(handlers::docs_handler))
        .route("/about", page("About"));

    apply_middleware(routes, config).with_state(state)
}

/// Wrap `routes` in the demo middleware stack.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. Catch panic - a panicking handler still yields a 500
/// 3. Inertia - version check, shared props, response commit
pub fn apply_middleware<S>(routes: Router<S>, config: InertiaConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    routes
        .layer(axum_middleware::from_fn_with_state(
            config.into_state(),
            inertia_middleware,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::new()),
        )
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the demo server.
pub async fn run_server(settings: ServerSettings) -> Result<(), InertiaError> {
    let config = build_config(&settings)?;
    tracing::debug!(?config, "adapter configured");
    let router = create_router(config, DemoState::seeded(30));

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| InertiaError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("inertia-axum demo listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| InertiaError::Io(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
