//! Structured error handling for API responses

pub mod codes;
pub mod common;
pub mod failure;
pub mod mapper;
pub mod response;
pub mod validation;

pub use codes::ErrorCode;
pub use common::CommonError;
pub use failure::{ApiError, MappedError, RaisedError};
pub use mapper::ExceptionMapper;
pub use response::{ErrorResponse, ValidationError};
pub use validation::{BindErrors, ConstraintViolation, ConstraintViolations, FieldError};
