use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Structured error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// HTTP status code
    http_status: u16,
    /// Human-readable error message
    message: String,
    /// Moment the failure was observed
    date_time: DateTime<Utc>,
    /// Field-level validation errors, in the order they were recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    validation_errors: Option<Vec<ValidationError>>,
    /// Formatted trace of the failure (only when enabled)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stack_trace: Option<String>,
}

/// One field-level validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response stamped with the current time
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            http_status: status.as_u16(),
            message: message.into(),
            date_time: Utc::now(),
            validation_errors: None,
            stack_trace: None,
        }
    }

    /// Append a validation error. Repeated fields are kept.
    pub fn add_validation_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.validation_errors
            .get_or_insert_with(Vec::new)
            .push(ValidationError {
                field: field.into(),
                message: message.into(),
            });
    }

    /// Replace the stack trace
    pub fn set_stack_trace(&mut self, trace: impl Into<String>) {
        self.stack_trace = Some(trace.into());
    }

    pub fn http_status(&self) -> u16 {
        self.http_status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn date_time(&self) -> DateTime<Utc> {
        self.date_time
    }

    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        self.validation_errors.as_deref()
    }

    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self)).into_response()
    }
}
