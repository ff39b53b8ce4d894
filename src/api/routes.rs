use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{create_user, fail, get_user, health, panic_handler, AppState};
use super::layer::with_error_handling;
use super::middleware::logging_middleware;
use super::openapi::ApiDoc;
use crate::errors::ExceptionMapper;
use crate::metrics;

pub fn create_router(state: AppState, mapper: Arc<ExceptionMapper>) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        .route("/health", get(health))
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        .route("/fail", get(fail))
        .route("/panic", get(panic_handler))
        .route("/metrics", get(metrics::metrics_handler));

    // Logging and metrics must wrap the error layer to see the mapped response
    with_error_handling(routes, mapper)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics::middleware::track_metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
