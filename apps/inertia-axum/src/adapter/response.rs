//! # Responses
//!
//! Builders for the protocol's response shapes, and `ErrorResponse`, the
//! axum-facing wrapper around `InertiaError`.

use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use inertia_core::protocol::{HEADER_INERTIA, HEADER_LOCATION};
use inertia_core::{InertiaError, Page};

/// `Vary` value naming the protocol marker header.
pub const VARY_INERTIA: &str = "X-Inertia";

fn inertia_header() -> HeaderName {
    HeaderName::from_static(HEADER_INERTIA)
}

fn location_header() -> HeaderName {
    HeaderName::from_static(HEADER_LOCATION)
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// An `InertiaError` on its way out as a 500.
///
/// The detail is logged, never sent to the client.
#[derive(Debug)]
pub struct ErrorResponse(pub InertiaError);

impl From<InertiaError> for ErrorResponse {
    fn from(err: InertiaError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        match &self.0 {
            InertiaError::NotInitialized => {
                tracing::error!("Inertia handle missing: is the middleware installed on this route?");
            }
            err => tracing::error!(error = %err, "Inertia response failed"),
        }
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

// =============================================================================
// PAGE RESPONSES
// =============================================================================

/// JSON page for a protocol request.
pub fn page_json_response(page: &Page) -> Result<Response, InertiaError> {
    let body = page.to_json()?;
    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response();
    let headers = response.headers_mut();
    headers.insert(header::VARY, HeaderValue::from_static(VARY_INERTIA));
    headers.insert(inertia_header(), HeaderValue::from_static("true"));
    Ok(response)
}

/// HTML document for a first visit.
pub fn page_html_response(html: String) -> Response {
    let mut response = Html(html).into_response();
    response
        .headers_mut()
        .insert(header::VARY, HeaderValue::from_static(VARY_INERTIA));
    response
}

/// External redirect: 409 + `X-Inertia-Location` for protocol requests (the
/// client then performs a full visit), an ordinary 302 otherwise.
pub fn location_response(is_inertia: bool, url: &str) -> Response {
    let Ok(target) = HeaderValue::try_from(url) else {
        return ErrorResponse(InertiaError::Config(format!(
            "redirect target '{}' is not a valid header value",
            url
        )))
        .into_response();
    };

    if is_inertia {
        let mut response = StatusCode::CONFLICT.into_response();
        response.headers_mut().insert(location_header(), target);
        response
    } else {
        let mut response = StatusCode::FOUND.into_response();
        response.headers_mut().insert(header::LOCATION, target);
        response
    }
}

/// True for responses that hand the browser to another URL.
pub(crate) fn is_redirect_like(response: &Response) -> bool {
    response.status().is_redirection()
        || (response.status() == StatusCode::CONFLICT
            && response.headers().contains_key(location_header()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use std::collections::BTreeMap;

    fn page() -> Page {
        Page {
            component: "Home".to_string(),
            props: Map::new(),
            url: "/".to_string(),
            version: "1".to_string(),
            encrypt_history: false,
            clear_history: false,
            deferred_props: BTreeMap::new(),
            merge_props: Vec::new(),
            deep_merge_props: Vec::new(),
            match_props_on: Vec::new(),
        }
    }

    #[test]
    fn json_response_headers() {
        let response = page_json_response(&page()).expect("json");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::VARY], "X-Inertia");
        assert_eq!(response.headers()["x-inertia"], "true");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn html_response_varies_on_marker() {
        let response = page_html_response("<html></html>".to_string());
        assert_eq!(response.headers()[header::VARY], "X-Inertia");
        assert!(response.headers().get("x-inertia").is_none());
    }

    #[test]
    fn location_for_protocol_request_is_conflict() {
        let response = location_response(true, "https://example.com/login");
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(response.headers()["x-inertia-location"], "https://example.com/login");
        assert!(is_redirect_like(&response));
    }

    #[test]
    fn location_for_plain_request_is_found() {
        let response = location_response(false, "/login");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/login");
        assert!(is_redirect_like(&response));
    }

    #[test]
    fn invalid_location_is_server_error() {
        let response = location_response(true, "bad\nurl");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_response_hides_detail() {
        let response = ErrorResponse(InertiaError::RendererMissing).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
