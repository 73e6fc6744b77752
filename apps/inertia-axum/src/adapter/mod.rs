//! # Axum Adapter
//!
//! Everything between axum and `inertia-core`.
//!
//! ## Modules
//!
//! - `config` - `InertiaConfig`, built once, shared by every request
//! - `middleware` - version check, handler call, response commit
//! - `context` - the per-request `Inertia` handle and its extractor
//! - `response` - protocol response shapes and `ErrorResponse`
//! - `render` - HTML root views
//! - `ssr` - server-side rendering over HTTP
//! - `session` - session storage for validation errors
//! - `cookie` - cookie parsing and `Set-Cookie` building
//! - `routing` - component-only routes

pub mod config;
pub mod context;
pub mod cookie;
pub mod middleware;
pub mod render;
pub mod response;
pub mod routing;
pub mod session;
pub mod ssr;

use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by the object-safe collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub use config::{InertiaConfig, InertiaState, SharedDataFn};
pub use context::Inertia;
pub use middleware::inertia_middleware;
pub use render::{RenderContext, Renderer, ShellRenderer};
pub use response::ErrorResponse;
pub use routing::{page, page_with_props};
pub use session::{MemorySessionStore, Session, SessionStore};
pub use ssr::{HttpSsrGateway, SsrEngine, SsrResponse};
