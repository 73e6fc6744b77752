//! # Demo Handlers

use super::DemoState;
use crate::adapter::{ErrorResponse, Inertia};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use inertia_core::{Prop, Props};
use serde::{Deserialize, Serialize};
use serde_json::{Map, json};
use std::time::{SystemTime, UNIX_EPOCH};

/// Users per page on `/users`.
const PER_PAGE: usize = 10;

/// A demo user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

/// Query string of `/users`.
#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    pub page: Option<usize>,
}

/// Body of `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    #[serde(default)]
    pub name: String,
}

/// 302 to `to`. Protocol requests after PUT/PATCH/DELETE see it as 303.
fn found(to: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, to)]).into_response()
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

// =============================================================================
// HOME
// =============================================================================

/// Every eager kind plus one lazy prop.
pub async fn home_handler(
    State(state): State<DemoState>,
    inertia: Inertia,
) -> Result<Response, ErrorResponse> {
    let count = state.users.read().await.len();

    let props = Props::new()
        .with("greeting", json!("Hello from axum"))
        .with("serverTime", Prop::provider(|| Ok(json!(unix_seconds()))))
        .with("userCount", Prop::always(json!(count)))
        .with(
            "stats",
            Prop::lazy(move || Ok(json!({ "users": count, "pages": count.div_ceil(PER_PAGE) }))),
        );

    let mut view_data = Map::new();
    view_data.insert("title".to_string(), json!("Home"));
    inertia.render_with_view_data("Home", props, view_data).await
}

// =============================================================================
// USERS
// =============================================================================

/// Infinite-scroll list: pages merge on the client, matched by id.
pub async fn users_handler(
    State(state): State<DemoState>,
    Query(query): Query<UsersQuery>,
    inertia: Inertia,
) -> Result<Response, ErrorResponse> {
    let users = state.users.read().await.clone();
    let page = query.page.unwrap_or(1).max(1);
    let slice: Vec<User> = users
        .iter()
        .skip((page - 1) * PER_PAGE)
        .take(PER_PAGE)
        .cloned()
        .collect();
    let total = users.len();

    let props = Props::new()
        .with("users", Prop::merge(json!(slice)).match_on(["id"]))
        .with("page", json!(page))
        .with(
            "filters",
            Prop::optional(|| Ok(json!({ "roles": ["admin", "member"] }))),
        )
        .with(
            "activity",
            Prop::defer(move || Ok(json!({ "total": total })))
                .group("sidebar"),
        )
        .with(
            "permissions",
            Prop::defer(|| Ok(json!(["users.create", "users.delete"]))),
        );

    inertia.render("Users/Index", props).await
}

pub async fn create_user_handler(inertia: Inertia) -> Result<Response, ErrorResponse> {
    inertia.render("Users/Create", Props::new()).await
}

/// Validation errors go to the session and survive the redirect back.
pub async fn store_user_handler(
    State(state): State<DemoState>,
    inertia: Inertia,
    Json(body): Json<CreateUser>,
) -> Result<Response, ErrorResponse> {
    let name = body.name.trim();
    if name.is_empty() {
        inertia
            .update_error_messages_with_session([("name", "The name field is required.")])
            .await?;
        return Ok(found("/users/create"));
    }

    let mut users = state.users.write().await;
    let id = users.iter().map(|u| u.id).max().unwrap_or_default() + 1;
    users.push(User {
        id,
        name: name.to_string(),
    });
    tracing::info!(id, "user created");
    Ok(found("/users"))
}

pub async fn delete_user_handler(
    State(state): State<DemoState>,
    Path(id): Path<u64>,
) -> Response {
    state.users.write().await.retain(|u| u.id != id);
    found("/users")
}

// =============================================================================
// HISTORY, SSR, REDIRECTS
// =============================================================================

/// The next page the client sees purges its history.
pub async fn logout_handler(inertia: Inertia) -> Response {
    inertia.clear_history();
    found("/")
}

pub async fn plain_handler(inertia: Inertia) -> Result<Response, ErrorResponse> {
    inertia.disable_ssr();
    inertia
        .render("Plain", Props::new().with("ssr", json!(false)))
        .await
}

pub async fn docs_handler(inertia: Inertia) -> Response {
    inertia.location("https://inertiajs.com")
}
