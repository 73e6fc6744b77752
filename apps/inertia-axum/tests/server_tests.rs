//! Integration tests for the demo site.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::Router;
use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::response::Response;
use axum::routing::get;
use axum_test::{TestRequest, TestServer};
use inertia_axum::adapter::{Inertia, page};
use inertia_axum::server::{DemoState, apply_middleware, build_config, create_router};
use inertia_axum::settings::ServerSettings;
use serde_json::{Value, json};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn test_settings() -> ServerSettings {
    ServerSettings {
        asset_version: Some("test".to_string()),
        ..ServerSettings::default()
    }
}

fn create_test_server() -> TestServer {
    let config = build_config(&test_settings()).unwrap();
    TestServer::new(create_router(config, DemoState::seeded(25))).unwrap()
}

fn inertia(request: TestRequest) -> TestRequest {
    request
        .add_header(
            HeaderName::from_static("x-inertia"),
            HeaderValue::from_static("true"),
        )
        .add_header(
            HeaderName::from_static("x-inertia-version"),
            HeaderValue::from_static("test"),
        )
}

// =============================================================================
// PAGES
// =============================================================================

#[tokio::test]
async fn test_home_first_visit_renders_builtin_shell() {
    let server = create_test_server();
    let response = server.get("/").await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("<title>Home</title>"));
    assert!(html.contains("data-page="));
}

#[tokio::test]
async fn test_home_props_and_shared_data() {
    let server = create_test_server();
    let page: Value = inertia(server.get("/")).await.json();

    assert_eq!(page["component"], "Home");
    assert_eq!(page["props"]["appName"], "inertia-axum demo");
    assert_eq!(page["props"]["requestPath"], "/");
    assert_eq!(page["props"]["userCount"], 25);
    assert!(page["props"]["serverTime"].is_u64());
    assert!(page["props"].get("stats").is_none());
}

#[tokio::test]
async fn test_users_pages_merge_by_id() {
    let server = create_test_server();
    let page: Value = inertia(server.get("/users").add_query_param("page", 3)).await.json();

    assert_eq!(page["props"]["users"], json!([
        {"id": 21, "name": "User 21"},
        {"id": 22, "name": "User 22"},
        {"id": 23, "name": "User 23"},
        {"id": 24, "name": "User 24"},
        {"id": 25, "name": "User 25"},
    ]));
    assert_eq!(page["mergeProps"], json!(["users"]));
    assert_eq!(page["matchPropsOn"], json!(["users.id"]));
    assert_eq!(
        page["deferredProps"],
        json!({"default": ["permissions"], "sidebar": ["activity"]})
    );
    assert!(page["props"].get("filters").is_none());
}

#[tokio::test]
async fn test_about_route_helper() {
    let server = create_test_server();
    let page: Value = inertia(server.get("/about")).await.json();
    assert_eq!(page["component"], "About");
}

// =============================================================================
// FORMS
// =============================================================================

#[tokio::test]
async fn test_invalid_user_redirects_back_with_errors() {
    let server = create_test_server();
    let response = inertia(server.post("/users"))
        .json(&json!({"name": "  "}))
        .await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/users/create");
    let cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let page: Value = inertia(server.get("/users/create"))
        .add_header(header::COOKIE, HeaderValue::from_str(&cookie).unwrap())
        .await
        .json();
    assert_eq!(page["component"], "Users/Create");
    assert_eq!(page["props"]["errors"]["name"], "The name field is required.");
}

#[tokio::test]
async fn test_valid_user_is_listed() {
    let server = create_test_server();
    let response = inertia(server.post("/users"))
        .json(&json!({"name": "Ada"}))
        .await;
    assert_eq!(response.headers()[header::LOCATION], "/users");

    let page: Value = inertia(server.get("/").add_header(
        HeaderName::from_static("x-inertia-partial-component"),
        HeaderValue::from_static("Home"),
    ))
    .add_header(
        HeaderName::from_static("x-inertia-partial-data"),
        HeaderValue::from_static("stats"),
    )
    .await
    .json();
    assert_eq!(page["props"]["stats"], json!({"users": 26, "pages": 3}));
    assert_eq!(page["props"]["userCount"], 26);
}

#[tokio::test]
async fn test_delete_redirect_is_see_other() {
    let server = create_test_server();
    let response = inertia(server.delete("/users/3")).await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);

    let response = server.delete("/users/4").await;
    assert_eq!(response.status_code(), StatusCode::FOUND);
}

// =============================================================================
// HISTORY AND REDIRECTS
// =============================================================================

#[tokio::test]
async fn test_logout_clears_history() {
    let server = create_test_server();
    let response = inertia(server.post("/logout")).await;
    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::SET_COOKIE],
        "inertia_clear_history=true; Path=/; HttpOnly"
    );
}

#[tokio::test]
async fn test_docs_is_external_redirect() {
    let server = create_test_server();
    let response = inertia(server.get("/docs")).await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.headers()["x-inertia-location"], "https://inertiajs.com");
}

#[tokio::test]
async fn test_stale_client_is_sent_home() {
    let server = create_test_server();
    let response = server
        .get("/users")
        .add_header(
            HeaderName::from_static("x-inertia"),
            HeaderValue::from_static("true"),
        )
        .add_header(
            HeaderName::from_static("x-inertia-version"),
            HeaderValue::from_static("old"),
        )
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.headers()["x-inertia-location"], "/users");
}

// =============================================================================
// PANICS
// =============================================================================

async fn exploding_handler(_inertia: Inertia) -> Response {
    panic!("handler failed")
}

#[tokio::test]
async fn test_demo_stack_turns_handler_panic_into_server_error() {
    let routes = Router::<DemoState>::new()
        .route("/boom", get(exploding_handler))
        .route("/about", page("About"));
    let config = build_config(&test_settings()).unwrap();
    let router = apply_middleware(routes, config).with_state(DemoState::seeded(1));
    let server = TestServer::new(router).unwrap();

    let response = inertia(server.get("/boom")).await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let about: Value = inertia(server.get("/about")).await.json();
    assert_eq!(about["component"], "About");
    assert_eq!(about["props"]["appName"], "inertia-axum demo");
}
