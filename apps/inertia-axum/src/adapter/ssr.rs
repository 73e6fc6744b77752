//! # Server-Side Rendering
//!
//! An `SsrEngine` turns a page into pre-rendered head and body fragments.
//! `HttpSsrGateway` delegates to an external render server (usually Node.js)
//! over HTTP: `POST {url}/render` with the page JSON, answered by
//! `{"head": [...], "body": "..."}`.
//!
//! A failed SSR call fails the whole response; there is no fallback to
//! client-side rendering.

use super::BoxFuture;
use inertia_core::{InertiaError, Page};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Address of a locally running SSR server.
pub const DEFAULT_SSR_URL: &str = "http://127.0.0.1:13714";

/// Default timeout for one SSR round trip.
pub const DEFAULT_SSR_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// SSR RESPONSE
// =============================================================================

/// Fragments produced by an SSR engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsrResponse {
    /// Elements for the document head.
    #[serde(default)]
    pub head: Vec<String>,
    /// Markup for the mount element.
    #[serde(default)]
    pub body: String,
}

impl SsrResponse {
    /// Head fragments joined one per line.
    pub fn head_html(&self) -> String {
        self.head.join("\n")
    }
}

// =============================================================================
// ENGINE TRAIT
// =============================================================================

/// Pre-renders pages on the server.
pub trait SsrEngine: Send + Sync {
    fn render<'a>(&'a self, page: &'a Page) -> BoxFuture<'a, Result<SsrResponse, InertiaError>>;
}

// =============================================================================
// HTTP GATEWAY
// =============================================================================

/// SSR engine backed by a remote render server.
#[derive(Debug, Clone)]
pub struct HttpSsrGateway {
    http: reqwest::Client,
    url: String,
}

impl HttpSsrGateway {
    /// A gateway to `url` with a per-call timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, InertiaError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InertiaError::Config(format!("cannot build SSR client: {}", e)))?;
        Ok(Self::with_client(url, http))
    }

    /// A gateway using a caller-supplied client.
    pub fn with_client(url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            url: url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Base URL of the render server.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, page: &Page) -> Result<SsrResponse, InertiaError> {
        let endpoint = format!("{}/render", self.url);
        let resp = self
            .http
            .post(&endpoint)
            .json(page)
            .send()
            .await
            .map_err(|e| InertiaError::SsrTransport(format!("{}: {}", endpoint, e)))?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(InertiaError::SsrTransport(format!(
                "status code is not 200: {}",
                status.as_u16()
            )));
        }

        resp.json::<SsrResponse>()
            .await
            .map_err(|e| InertiaError::SsrTransport(format!("invalid SSR response: {}", e)))
    }
}

impl SsrEngine for HttpSsrGateway {
    fn render<'a>(&'a self, page: &'a Page) -> BoxFuture<'a, Result<SsrResponse, InertiaError>> {
        Box::pin(async move {
            tracing::debug!(component = %page.component, url = %self.url, "SSR render");
            self.call(page).await
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
