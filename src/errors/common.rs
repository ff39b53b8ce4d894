use std::error::Error as StdError;

use super::codes::ErrorCode;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Application failure tagged with an error code
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CommonError {
    code: ErrorCode,
    args: Vec<String>,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl CommonError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            args: Vec::new(),
            message: message.into(),
            source: None,
        }
    }

    /// Attach positional arguments describing the failure
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Attach the underlying cause
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_message() {
        let err = CommonError::new(ErrorCode::GenericError, "user 42 not found").with_args(["42"]);
        assert_eq!(err.to_string(), "user 42 not found");
        assert_eq!(err.code(), ErrorCode::GenericError);
        assert_eq!(err.args(), ["42".to_string()]);
        assert!(err.source().is_none());
    }

    #[test]
    fn test_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
        let err = CommonError::new(ErrorCode::GenericError, "lookup failed").with_source(io);

        let source = err.source().expect("source should be set");
        assert_eq!(source.to_string(), "connection reset");
    }
}
