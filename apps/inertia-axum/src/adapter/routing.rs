//! # Route Helpers
//!
//! Shortcuts for routes that only render a component.
//!
//! ```ignore
//! Router::new()
//!     .route("/about", page("About"))
//!     .route("/terms", page_with_props("Legal", Props::new().with("doc", json!("terms"))))
//! ```

use super::context::Inertia;
use super::response::ErrorResponse;
use axum::response::Response;
use axum::routing::{MethodRouter, get};
use inertia_core::Props;

/// GET route rendering `component` with no props.
pub fn page<S>(component: &'static str) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    page_with_props(component, Props::new())
}

/// GET route rendering `component` with fixed props.
pub fn page_with_props<S>(component: &'static str, props: Props) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    get(move |inertia: Inertia| async move {
        let response: Result<Response, ErrorResponse> = inertia.render(component, props).await;
        response
    })
}
