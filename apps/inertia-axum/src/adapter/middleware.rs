//! # Protocol Middleware
//!
//! Runs around every handler on an Inertia route:
//!
//! 1. Build the request's `Inertia` handle.
//! 2. Stale asset version on a protocol GET: answer 409 with the request path
//!    and skip the handler.
//! 3. Compute shared props (a failing hook answers 500 without the handler),
//!    attach the handle, run the handler.
//! 4. Commit: rewrite 302 to 303 after PUT/PATCH/DELETE, carry or expire the
//!    clear-history cookie, append queued cookies.

use super::config::InertiaState;
use super::context::{ClearHistoryOutcome, Inertia};
use super::cookie::SetCookie;
use super::response::{ErrorResponse, is_redirect_like, location_response};
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use inertia_core::protocol::{HEADER_VERSION, is_version_stale, normalize_redirect_status};

/// The orchestrator. Install with `axum::middleware::from_fn_with_state`.
pub async fn inertia_middleware(
    State(config): State<InertiaState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let inertia = Inertia::for_request(config.clone(), &parts);

    // handlers may override the page version later; the check uses the
    // configured one
    let server_version = inertia.version();
    let client_version = parts
        .headers
        .get(HEADER_VERSION)
        .and_then(|v| v.to_str().ok());
    if is_version_stale(
        inertia.is_inertia_request(),
        parts.method.as_str(),
        client_version,
        &server_version,
    ) {
        tracing::debug!(
            path = inertia.path(),
            client = client_version.unwrap_or_default(),
            server = %server_version,
            "asset version mismatch, forcing full reload"
        );
        return location_response(true, inertia.path());
    }

    if let Some(share) = &config.share {
        match share(&parts).await {
            Ok(props) => inertia.share_props(props),
            Err(err) => {
                tracing::warn!(path = inertia.path(), "shared data failed, handler skipped");
                return ErrorResponse(err).into_response();
            }
        }
    }

    parts.extensions.insert(inertia.clone());
    let pending = PendingResponse::new(inertia);
    let response = next.run(Request::from_parts(parts, body)).await;
    pending.commit(response)
}

// =============================================================================
// COMMIT
// =============================================================================

/// A handler response that has not been finalised yet.
struct PendingResponse {
    inertia: Inertia,
    committed: bool,
}

impl PendingResponse {
    fn new(inertia: Inertia) -> Self {
        Self {
            inertia,
            committed: false,
        }
    }

    fn commit(mut self, mut response: Response) -> Response {
        self.committed = true;
        let inertia = &self.inertia;

        let status = normalize_redirect_status(
            inertia.is_inertia_request(),
            inertia.method().as_str(),
            response.status().as_u16(),
        );
        if status != response.status().as_u16() {
            tracing::debug!(
                method = %inertia.method(),
                path = inertia.path(),
                "rewriting 302 to 303"
            );
            *response.status_mut() = StatusCode::SEE_OTHER;
        }

        let outcome = inertia.clear_history_outcome();
        let redirect = is_redirect_like(&response);
        let mut cookies = inertia.take_cookies();
        if let Some(cookie) = clear_history_cookie(&outcome, redirect) {
            cookies.push(cookie);
        }

        let headers = response.headers_mut();
        for cookie in cookies {
            headers.append(header::SET_COOKIE, cookie);
        }
        response
    }
}

impl Drop for PendingResponse {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // A panic caught by an outer layer drops this future after the
        // unwind has finished, so `thread::panicking()` cannot tell the cases
        // apart.
        tracing::warn!(
            path = self.inertia.path(),
            "request dropped before commit (handler panic or client disconnect)"
        );
    }
}

/// The clear-history cookie to send, if any.
///
/// A clear request still pending is carried over a redirect. Otherwise a
/// received cookie is expired so the flag applies to one page only.
fn clear_history_cookie(outcome: &ClearHistoryOutcome, redirect: bool) -> Option<HeaderValue> {
    if outcome.pending && redirect {
        return SetCookie::new(&outcome.cookie_name, "true")
            .path("/")
            .http_only()
            .to_header_value();
    }
    if outcome.cookie_present {
        return SetCookie::removal(&outcome.cookie_name)
            .path("/")
            .http_only()
            .to_header_value();
    }
    if outcome.pending {
        tracing::debug!("clear-history request dropped: response is not a page or redirect");
    }
    None
}

// =============================================================================
// TESTS
// =============================================================================
