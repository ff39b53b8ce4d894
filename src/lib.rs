//! Structured error responses and centralized failure mapping for axum services

pub mod api;
pub mod config;
pub mod errors;
pub mod i18n;
pub mod metrics;

pub use api::{with_error_handling, ValidatedJson};
pub use errors::{ApiError, ErrorResponse, ExceptionMapper};
