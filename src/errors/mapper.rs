use std::sync::Arc;
use tracing::{error, warn};

use super::codes::ErrorCode;
use super::failure::ApiError;
use super::response::ErrorResponse;
use crate::i18n::{BundleMessageSource, Locale, MessageSource};
use crate::metrics::ERRORS_MAPPED_TOTAL;

/// Translates a raised [`ApiError`] into exactly one [`ErrorResponse`].
///
/// Configuration is fixed at construction and only read afterwards, so one
/// mapper can be shared behind an `Arc` by every request.
#[derive(Clone)]
pub struct ExceptionMapper {
    print_stack_trace: bool,
    message_source: Arc<dyn MessageSource>,
    default_locale: Locale,
}

impl ExceptionMapper {
    pub fn new(print_stack_trace: bool, message_source: Arc<dyn MessageSource>) -> Self {
        Self {
            print_stack_trace,
            message_source,
            default_locale: Locale::default(),
        }
    }

    /// Locale used when the request does not name one
    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    pub fn print_stack_trace(&self) -> bool {
        self.print_stack_trace
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    /// Map a failure using the default locale
    pub fn map_default(&self, failure: &ApiError) -> ErrorResponse {
        self.map(failure, &self.default_locale)
    }

    pub fn map(&self, failure: &ApiError, locale: &Locale) -> ErrorResponse {
        let status = failure.status();
        let trace = failure.stack_trace();

        error!(
            kind = failure.kind(),
            status = status.as_u16(),
            error_code = failure.error_code().code(),
            details = %trace,
            "{}",
            log_message(failure)
        );

        let mut response = match failure {
            ApiError::ConstraintViolation(violations) => {
                let mut response = ErrorResponse::new(
                    status,
                    self.localized(ErrorCode::ConstraintValidationError, locale),
                );
                for violation in violations.violations() {
                    response.add_validation_error(&violation.property_path, &violation.message);
                }
                response
            }
            ApiError::InvalidBody(bind) => {
                let mut response = ErrorResponse::new(
                    status,
                    self.localized(ErrorCode::ConstraintValidationError, locale),
                );
                for field_error in bind.field_errors() {
                    response.add_validation_error(&field_error.field, &field_error.default_message);
                }
                response
            }
            ApiError::BodyRejected(rejection) => {
                ErrorResponse::new(status, rejection.body_text())
            }
            ApiError::Panic(None) => {
                ErrorResponse::new(status, self.localized(ErrorCode::GenericError, locale))
            }
            ApiError::Panic(Some(message)) => ErrorResponse::new(status, message.as_str()),
            ApiError::Common(_) | ApiError::Internal(_) | ApiError::Framework { .. } => {
                let message = failure.to_string();
                if message.is_empty() {
                    ErrorResponse::new(status, self.localized(ErrorCode::GenericError, locale))
                } else {
                    ErrorResponse::new(status, message)
                }
            }
        };

        if self.print_stack_trace {
            response.set_stack_trace(trace);
        }

        ERRORS_MAPPED_TOTAL
            .with_label_values(&[failure.kind(), &status.as_u16().to_string()])
            .inc();

        response
    }

    /// Look up the message for `code`, falling back to the built-in default
    fn localized(&self, code: ErrorCode, locale: &Locale) -> String {
        match self.message_source.lookup(&code.message_key(), locale) {
            Ok(message) => message,
            Err(e) => {
                warn!(
                    code = code.code(),
                    locale = %locale,
                    "Message lookup failed, using default: {}",
                    e
                );
                code.default_message().to_string()
            }
        }
    }
}

impl Default for ExceptionMapper {
    fn default() -> Self {
        Self::new(false, Arc::new(BundleMessageSource::builtin()))
    }
}

fn log_message(failure: &ApiError) -> &'static str {
    match failure {
        ApiError::ConstraintViolation(_) => "Constraint violation error occurred",
        ApiError::InvalidBody(_) => "Request body validation error occurred",
        ApiError::BodyRejected(_) => "Request body rejected",
        ApiError::Framework { .. } => "Request rejected before reaching the handler",
        _ => "Unknown error occurred",
    }
}
