use axum::{
    extract::{Request, State},
    http::header::{ACCEPT_LANGUAGE, ALLOW, CONTENT_TYPE},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

use crate::errors::{ApiError, ExceptionMapper, MappedError, RaisedError};
use crate::i18n::Locale;

/// Largest framework error body read back into the mapped message
const FRAMEWORK_BODY_LIMIT: usize = 64 * 1024;

/// Render any [`ApiError`] left on the response by the handler or an extractor.
///
/// Error responses axum builds on its own (path/query rejections, 405, 404)
/// are converted into [`ApiError::Framework`] and rendered the same way.
/// Error responses that already carry a JSON body pass through untouched.
pub async fn map_errors(
    State(mapper): State<Arc<ExceptionMapper>>,
    request: Request,
    next: Next,
) -> Response {
    let locale = request
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .and_then(Locale::from_accept_language)
        .unwrap_or_else(|| mapper.default_locale().clone());

    let mut response = next.run(request).await;

    let allow = response.headers().get(ALLOW).cloned();
    let raised = response.extensions_mut().remove::<RaisedError>();
    let failure = match raised {
        Some(RaisedError(failure)) => failure,
        None if is_framework_error(&response) => Arc::new(framework_failure(response).await),
        None => return response,
    };

    let mut mapped = mapper.map(&failure, &locale).into_response();
    if let Some(allow) = allow {
        mapped.headers_mut().insert(ALLOW, allow);
    }
    mapped.extensions_mut().insert(MappedError {
        kind: failure.kind(),
    });
    mapped
}

fn is_framework_error(response: &Response) -> bool {
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return false;
    }

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);
    !is_json
}

async fn framework_failure(response: Response) -> ApiError {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), FRAMEWORK_BODY_LIMIT)
        .await
        .unwrap_or_default();

    let text = String::from_utf8_lossy(&body).trim().to_string();
    let message = if text.is_empty() {
        status.canonical_reason().unwrap_or("Request failed").to_string()
    } else {
        text
    };

    ApiError::Framework { status, message }
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    ApiError::from_panic(payload).into_response()
}

/// Install the panic catcher and the error-mapping middleware.
///
/// Layers only wrap routes added before this call, so register routes first.
pub fn with_error_handling<S>(router: Router<S>, mapper: Arc<ExceptionMapper>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(mapper, map_errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConstraintViolations;
    use axum::{body::Body, extract::Path, http::StatusCode, routing::get, Json};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn violation() -> Result<&'static str, ApiError> {
        Err(ConstraintViolations::new()
            .with("email", "must not be blank")
            .into())
    }

    async fn ok() -> &'static str {
        "fine"
    }

    async fn item(Path(id): Path<u32>) -> String {
        id.to_string()
    }

    async fn missing_json() -> (StatusCode, Json<Value>) {
        (StatusCode::NOT_FOUND, Json(json!({ "reason": "gone" })))
    }

    fn app() -> Router {
        let router = Router::new()
            .route("/violation", get(violation))
            .route("/ok", get(ok))
            .route("/items/:id", get(item))
            .route("/missing", get(missing_json));
        with_error_handling(router, Arc::new(ExceptionMapper::default()))
    }

    async fn send(method: &str, uri: &str) -> Response {
        app()
            .oneshot(
                axum::http::Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_failure_is_rendered() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/violation")
                    .header(ACCEPT_LANGUAGE, "it")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.extensions().get::<RaisedError>().is_none());
        assert_eq!(
            response.extensions().get::<MappedError>().unwrap().kind,
            "constraint_violation"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Errore di validazione");
        assert_eq!(json["validationErrors"][0]["field"], "email");
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let response = app()
            .oneshot(axum::http::Request::builder().uri("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.extensions().get::<MappedError>().is_none());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"fine");
    }

    #[tokio::test]
    async fn test_path_rejection_is_rendered() {
        let response = send("GET", "/items/abc").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.extensions().get::<MappedError>().unwrap().kind,
            "framework"
        );

        let json = body_json(response).await;
        assert_eq!(json["httpStatus"], 400);
        assert!(json["message"].as_str().unwrap().contains("Cannot parse"));
        assert!(json.get("validationErrors").is_none());
    }

    #[tokio::test]
    async fn test_method_not_allowed_is_rendered() {
        let response = send("POST", "/ok").await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers().contains_key(ALLOW));

        let json = body_json(response).await;
        assert_eq!(json["httpStatus"], 405);
        assert_eq!(json["message"], "Method Not Allowed");
    }

    #[tokio::test]
    async fn test_json_error_from_handler_passes_through() {
        let response = send("GET", "/missing").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<MappedError>().is_none());
        assert_eq!(body_json(response).await, json!({ "reason": "gone" }));
    }
}
