use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use super::extract::ValidatedJson;
use crate::errors::{ApiError, CommonError, ConstraintViolations, ErrorCode, ErrorResponse};

lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

/// In-memory user store backing the demo routes
#[derive(Default)]
pub struct AppStateInner {
    pub users: RwLock<HashMap<i64, User>>,
    pub next_id: AtomicI64,
}

/// User registration payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NewUser {
    /// Display name
    #[validate(length(min = 1, max = 64, message = "must be between 1 and 64 characters"))]
    pub name: String,
    /// Contact address
    #[validate(email(message = "must be a well-formed email address"))]
    pub email: String,
    /// Age in years
    #[validate(range(min = 13, max = 150, message = "must be between 13 and 150"))]
    pub age: u32,
}

/// Stored user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: u32,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value)
    )
)]
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "common-error-demo",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}

/// Register a user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = NewUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid request body", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(new_user): ValidatedJson<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let id = state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let user = User {
        id,
        name: new_user.name,
        email: new_user.email,
        age: new_user.age,
    };

    state.users.write().await.insert(id, user.clone());
    info!("Created user {}", id);

    Ok((StatusCode::CREATED, Json(user)))
}

/// Fetch a user by id
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id, starting at 1")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 400, description = "Invalid id", body = ErrorResponse),
        (status = 500, description = "Unknown user", body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    if id < 1 {
        return Err(ConstraintViolations::new()
            .with("id", "must be greater than or equal to 1")
            .into());
    }

    let users = state.users.read().await;
    let user = users.get(&id).cloned().ok_or_else(|| {
        CommonError::new(ErrorCode::GenericError, format!("User {} not found", id))
            .with_args([id.to_string()])
    })?;

    Ok(Json(user))
}

/// Always fails with an internal error
#[utoipa::path(
    get,
    path = "/fail",
    tag = "demo",
    responses(
        (status = 500, description = "Internal failure", body = ErrorResponse)
    )
)]
pub async fn fail() -> Result<Json<User>, ApiError> {
    Err(anyhow::anyhow!("disk full").into())
}

/// Always panics
#[utoipa::path(
    get,
    path = "/panic",
    tag = "demo",
    responses(
        (status = 500, description = "Handler panicked", body = ErrorResponse)
    )
)]
pub async fn panic_handler() -> Json<User> {
    panic!("handler panicked on purpose")
}
