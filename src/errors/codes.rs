use std::fmt;

/// Error codes used as message-lookup keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// No error
    Ok,

    /// Unclassified failure
    GenericError,

    /// Request or value failed declarative validation
    ConstraintValidationError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl ErrorCode {
    /// Numeric value of the code
    pub fn code(&self) -> u16 {
        match self {
            Self::Ok => 0,
            Self::GenericError => 100,
            Self::ConstraintValidationError => 101,
        }
    }

    /// Key under which the localized message is stored in a bundle
    pub fn message_key(&self) -> String {
        self.code().to_string()
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::GenericError => 500,
            Self::ConstraintValidationError => 400,
        }
    }

    /// Message used when no bundle provides one
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::GenericError => "An unexpected error occurred",
            Self::ConstraintValidationError => "Validation failed",
        }
    }
}
