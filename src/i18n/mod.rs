//! Localized message lookup keyed by error code

pub mod bundle;
pub mod locale;

pub use bundle::BundleMessageSource;
pub use locale::Locale;

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("no message for code '{code}' in locale '{locale}'")]
    NotFound { code: String, locale: String },

    #[error("invalid locale tag '{0}'")]
    InvalidLocale(String),

    #[error("failed to read message bundle {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse message bundle: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Lookup from an error code and locale to a localized message
pub trait MessageSource: Send + Sync {
    fn lookup(&self, code: &str, locale: &Locale) -> Result<String, MessageError>;
}
