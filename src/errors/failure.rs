use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::any::Any;
use std::error::Error as StdError;
use std::sync::Arc;
use validator::ValidationErrors;

use super::codes::ErrorCode;
use super::common::CommonError;
use super::validation::{BindErrors, ConstraintViolations};

/// Every failure a handler can raise, classified at the point it is raised
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Values failed declarative validation outside request binding
    #[error(transparent)]
    ConstraintViolation(#[from] ConstraintViolations),

    /// The request body deserialized but failed field validation
    #[error(transparent)]
    InvalidBody(#[from] BindErrors),

    /// The request body could not be read or deserialized
    #[error(transparent)]
    BodyRejected(#[from] JsonRejection),

    /// Application failure carrying an error code
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Any other failure propagated with `?`
    #[error(transparent)]
    Internal(#[from] anyhow::Error),

    /// A handler panicked
    #[error("handler panicked: {}", .0.as_deref().unwrap_or("non-string payload"))]
    Panic(Option<String>),

    /// An error response produced by the framework itself (path/query
    /// rejections, 404, 405), keeping its status and text
    #[error("{message}")]
    Framework { status: StatusCode, message: String },
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::ConstraintViolation(errors.into())
    }
}

impl ApiError {
    /// Build from a caught panic payload
    pub fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<String>() {
            Some(s.clone())
        } else {
            payload.downcast_ref::<&str>().map(|s| s.to_string())
        };
        Self::Panic(message)
    }

    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConstraintViolation(_) => "constraint_violation",
            Self::InvalidBody(_) => "invalid_body",
            Self::BodyRejected(_) => "body_rejected",
            Self::Common(_) => "common",
            Self::Internal(_) => "internal",
            Self::Panic(_) => "panic",
            Self::Framework { .. } => "framework",
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ConstraintViolation(_) | Self::InvalidBody(_) | Self::BodyRejected(_) => {
                ErrorCode::ConstraintValidationError
            }
            Self::Common(err) => err.code(),
            Self::Internal(_) | Self::Panic(_) | Self::Framework { .. } => ErrorCode::GenericError,
        }
    }

    /// Request-validation failures are 400 and framework errors keep their
    /// own status; everything else is 500
    pub fn status(&self) -> StatusCode {
        let code = match self {
            Self::Framework { status, .. } => return *status,
            Self::ConstraintViolation(_) | Self::InvalidBody(_) | Self::BodyRejected(_) => {
                ErrorCode::ConstraintValidationError
            }
            Self::Common(_) | Self::Internal(_) | Self::Panic(_) => ErrorCode::GenericError,
        };
        StatusCode::from_u16(code.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Full textual trace: message, cause chain and backtrace when one was captured
    pub fn stack_trace(&self) -> String {
        if let Self::Internal(err) = self {
            return format!("{:?}", err);
        }

        let label = match self {
            Self::ConstraintViolation(_) => "ConstraintViolations",
            Self::InvalidBody(_) => "BindErrors",
            Self::BodyRejected(_) => "JsonRejection",
            Self::Common(_) => "CommonError",
            Self::Internal(_) => "Error",
            Self::Panic(_) => "Panic",
            Self::Framework { .. } => "Framework",
        };

        let mut trace = format!("{}: {}", label, self);
        let mut source = StdError::source(self);
        while let Some(cause) = source {
            trace.push_str("\nCaused by: ");
            trace.push_str(&cause.to_string());
            source = cause.source();
        }
        trace
    }
}

/// Failure attached to a response, waiting for the error layer to render it
#[derive(Debug, Clone)]
pub struct RaisedError(pub Arc<ApiError>);

/// Marker left on a response the error layer rendered
#[derive(Debug, Clone, Copy)]
pub struct MappedError {
    pub kind: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response
            .extensions_mut()
            .insert(RaisedError(Arc::new(self)));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_by_kind() {
        let violation: ApiError = ConstraintViolations::new().with("email", "invalid").into();
        assert_eq!(violation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(violation.kind(), "constraint_violation");

        let bind: ApiError = BindErrors::new("User").into();
        assert_eq!(bind.status(), StatusCode::BAD_REQUEST);

        let internal: ApiError = anyhow::anyhow!("disk full").into();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.error_code(), ErrorCode::GenericError);

        let common: ApiError =
            CommonError::new(ErrorCode::ConstraintValidationError, "bad state").into();
        assert_eq!(common.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(common.error_code(), ErrorCode::ConstraintValidationError);
    }

    #[test]
    fn test_framework_keeps_status() {
        let err = ApiError::Framework {
            status: StatusCode::METHOD_NOT_ALLOWED,
            message: "Method Not Allowed".to_string(),
        };
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.kind(), "framework");
        assert_eq!(err.stack_trace(), "Framework: Method Not Allowed");
    }

    #[test]
    fn test_from_panic_payloads() {
        let err = ApiError::from_panic(Box::new("static message"));
        assert!(matches!(err, ApiError::Panic(Some(ref m)) if m == "static message"));

        let err = ApiError::from_panic(Box::new(String::from("owned message")));
        assert!(matches!(err, ApiError::Panic(Some(ref m)) if m == "owned message"));

        let err = ApiError::from_panic(Box::new(42_u32));
        assert!(matches!(err, ApiError::Panic(None)));
        assert_eq!(err.to_string(), "handler panicked: non-string payload");
    }

    #[test]
    fn test_stack_trace_includes_cause_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "socket closed");
        let err: ApiError = CommonError::new(ErrorCode::GenericError, "fetch failed")
            .with_source(io)
            .into();

        let trace = err.stack_trace();
        assert!(trace.starts_with("CommonError: fetch failed"));
        assert!(trace.contains("Caused by: socket closed"));
    }

    #[test]
    fn test_stack_trace_for_anyhow() {
        let err: ApiError = anyhow::anyhow!("disk full").context("write failed").into();
        let trace = err.stack_trace();
        assert!(trace.contains("write failed"));
        assert!(trace.contains("disk full"));
    }

    #[test]
    fn test_into_response_carries_failure() {
        let response = ApiError::from(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let raised = response.extensions().get::<RaisedError>().unwrap();
        assert_eq!(raised.0.kind(), "internal");
    }
}
