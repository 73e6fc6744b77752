//! Integration tests for HTML rendering and the HTTP SSR gateway.
//!
//! The SSR side runs a throwaway axum server on an ephemeral port.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, response::IntoResponse};
use axum_test::TestServer;
use inertia_axum::adapter::{
    HttpSsrGateway, Inertia, InertiaConfig, ShellRenderer, SsrEngine, inertia_middleware,
};
use inertia_core::{InertiaError, Page, Props, VersionSource};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::time::Duration;

const SHELL: &str = "<html><head>@inertiaHead<title>@{title}</title></head><body>@inertia</body></html>";

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Start an SSR stand-in and return its base URL.
async fn spawn_ssr(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Echoes the component name back as pre-rendered markup.
fn echo_ssr() -> Router {
    Router::new().route(
        "/render",
        post(|Json(page): Json<Value>| async move {
            Json(json!({
                "head": ["<meta name=\"ssr\" content=\"1\">"],
                "body": format!("<div id=\"app\">{}</div>", page["component"].as_str().unwrap_or("")),
            }))
        }),
    )
}

fn failing_ssr() -> Router {
    Router::new().route(
        "/render",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response() }),
    )
}

fn page(component: &str) -> Page {
    Page {
        component: component.to_string(),
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

fn app(config: InertiaConfig) -> TestServer {
    let router = Router::new()
        .route(
            "/",
            get(|inertia: Inertia| async move {
                let mut view_data = Map::new();
                view_data.insert("title".to_string(), json!("Dash <1>"));
                inertia
                    .render_with_view_data("Dashboard", Props::new(), view_data)
                    .await
            }),
        )
        .route(
            "/csr",
            get(|inertia: Inertia| async move {
                inertia.disable_ssr();
                inertia.render("Dashboard", Props::new()).await
            }),
        )
        .route(
            "/admin",
            get(|inertia: Inertia| async move {
                inertia.set_root_view("admin.html");
                inertia.render("Admin", Props::new()).await
            }),
        )
        .layer(axum::middleware::from_fn_with_state(
            config.into_state(),
            inertia_middleware,
        ));
    TestServer::new(router).unwrap()
}

fn renderer() -> ShellRenderer {
    ShellRenderer::new()
        .with_template("app.html", SHELL)
        .with_template("admin.html", "<main>@inertia</main>")
}

// =============================================================================
// GATEWAY
// =============================================================================

#[tokio::test]
async fn test_gateway_posts_page_and_reads_fragments() {
    let url = spawn_ssr(echo_ssr()).await;
    let gateway = HttpSsrGateway::new(url, Duration::from_secs(2)).unwrap();

    let ssr = gateway.render(&page("Profile")).await.unwrap();
    assert_eq!(ssr.head, vec!["<meta name=\"ssr\" content=\"1\">"]);
    assert_eq!(ssr.body, "<div id=\"app\">Profile</div>");
}

#[tokio::test]
async fn test_gateway_non_ok_status_is_transport_error() {
    let url = spawn_ssr(failing_ssr()).await;
    let gateway = HttpSsrGateway::new(url, Duration::from_secs(2)).unwrap();

    let err = gateway.render(&page("Profile")).await.unwrap_err();
    match err {
        InertiaError::SsrTransport(msg) => assert_eq!(msg, "status code is not 200: 500"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_gateway_unreachable_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gateway =
        HttpSsrGateway::new(format!("http://{}", addr), Duration::from_millis(500)).unwrap();
    let err = gateway.render(&page("Profile")).await.unwrap_err();
    assert!(matches!(err, InertiaError::SsrTransport(_)));
}

// =============================================================================
// END TO END
// =============================================================================

#[tokio::test]
async fn test_first_visit_uses_ssr_fragments() {
    let url = spawn_ssr(echo_ssr()).await;
    let config = InertiaConfig::new()
        .version(VersionSource::fixed("1"))
        .renderer(renderer())
        .ssr(HttpSsrGateway::new(url, Duration::from_secs(2)).unwrap());
    let server = app(config);

    let html = server.get("/").await.text();
    assert_eq!(
        html,
        "<html><head><meta name=\"ssr\" content=\"1\"><title>Dash &lt;1&gt;</title></head>\
         <body><div id=\"app\">Dashboard</div></body></html>"
    );
}

#[tokio::test]
async fn test_disabled_ssr_embeds_page() {
    let url = spawn_ssr(echo_ssr()).await;
    let config = InertiaConfig::new()
        .version(VersionSource::fixed("1"))
        .renderer(renderer())
        .ssr(HttpSsrGateway::new(url, Duration::from_secs(2)).unwrap());
    let server = app(config);

    let html = server.get("/csr").await.text();
    assert!(html.contains("<div id=\"app\" data-page=\""));
    assert!(!html.contains("ssr"));
}

#[tokio::test]
async fn test_ssr_failure_fails_response() {
    let url = spawn_ssr(failing_ssr()).await;
    let config = InertiaConfig::new()
        .version(VersionSource::fixed("1"))
        .renderer(renderer())
        .ssr(HttpSsrGateway::new(url, Duration::from_secs(2)).unwrap());
    let server = app(config);

    let response = server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_root_view_switch_per_request() {
    let config = InertiaConfig::new()
        .version(VersionSource::fixed("1"))
        .renderer(renderer());
    let server = app(config);

    let html = server.get("/admin").await.text();
    assert!(html.starts_with("<main><div id=\"app\" data-page=\""));
    assert!(html.contains("&#34;component&#34;:&#34;Admin&#34;"));
}

#[tokio::test]
async fn test_unknown_root_view_is_server_error() {
    let config = InertiaConfig::new()
        .version(VersionSource::fixed("1"))
        .root_view("missing.html")
        .renderer(renderer());
    let server = app(config);

    let response = server.get("/csr").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}
