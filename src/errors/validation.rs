//! Request-validation failure shapes built from `validator` results.

use std::fmt;
use validator::{ValidationErrors, ValidationErrorsKind};

/// A single violated constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub property_path: String,
    pub message: String,
}

/// Constraint violations raised while validating values outside request binding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintViolations {
    violations: Vec<ConstraintViolation>,
}

impl ConstraintViolations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, property_path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(ConstraintViolation {
            property_path: property_path.into(),
            message: message.into(),
        });
    }

    /// Builder-style variant of [`push`](Self::push)
    pub fn with(mut self, property_path: impl Into<String>, message: impl Into<String>) -> Self {
        self.push(property_path, message);
        self
    }

    pub fn violations(&self) -> &[ConstraintViolation] {
        &self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for ConstraintViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "constraint validation failed")?;
        for (i, v) in self.violations.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{}{}: {}", sep, v.property_path, v.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConstraintViolations {}

impl From<ValidationErrors> for ConstraintViolations {
    fn from(errors: ValidationErrors) -> Self {
        Self::from(&errors)
    }
}

impl From<&ValidationErrors> for ConstraintViolations {
    fn from(errors: &ValidationErrors) -> Self {
        let mut violations = Self::new();
        for (path, message) in flatten(errors) {
            violations.push(path, message);
        }
        violations
    }
}

/// A rejected field of a bound request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub default_message: String,
}

/// Field errors produced while binding a request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindErrors {
    object_name: String,
    field_errors: Vec<FieldError>,
}

impl BindErrors {
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            field_errors: Vec::new(),
        }
    }

    /// Collect the field errors of a failed `validate()` call on `object_name`
    pub fn from_validation(object_name: impl Into<String>, errors: &ValidationErrors) -> Self {
        let mut bind = Self::new(object_name);
        for (field, message) in flatten(errors) {
            bind.reject(field, message);
        }
        bind
    }

    pub fn reject(&mut self, field: impl Into<String>, default_message: impl Into<String>) {
        self.field_errors.push(FieldError {
            field: field.into(),
            default_message: default_message.into(),
        });
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }
}

impl fmt::Display for BindErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "validation failed for '{}' with {} field error(s)",
            self.object_name,
            self.field_errors.len()
        )
    }
}

impl std::error::Error for BindErrors {}

/// Flatten nested validator output into `(path, message)` pairs.
///
/// `validator` keeps errors in a hash map, so paths are sorted to keep the
/// output stable between calls. Errors on the same path keep their order.
fn flatten(errors: &ValidationErrors) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into(errors, "", &mut out);
    out
}

fn flatten_into(errors: &ValidationErrors, prefix: &str, out: &mut Vec<(String, String)>) {
    let mut entries: Vec<_> = errors.errors().iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (key, kind) in entries {
        let path = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", prefix, key)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    out.push((path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(nested) => flatten_into(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    flatten_into(nested, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}
