use anyhow::{Context, Result};
use std::env;
use std::sync::Arc;

use crate::errors::ExceptionMapper;
use crate::i18n::{BundleMessageSource, Locale};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub errors: ErrorConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ErrorConfig {
    /// Attach stack traces to error responses. Keep off in production.
    pub print_stack_trace: bool,
    /// JSON message bundles overlaid on the built-in ones
    pub messages_path: Option<String>,
    pub default_locale: Locale,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            server: ServerConfig {
                host: get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get("API_PORT")
                    .unwrap_or_else(|| "8080".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
            },
            errors: ErrorConfig::from_lookup(&get)?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ErrorConfig {
    pub fn from_lookup<F>(get: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_locale = get("COMMON_DEFAULT_LOCALE").unwrap_or_else(|| "en".to_string());

        Ok(ErrorConfig {
            print_stack_trace: get("COMMON_PRINT_STACK_TRACE")
                .unwrap_or_else(|| "false".to_string())
                .parse()
                .context("COMMON_PRINT_STACK_TRACE must be true or false")?,
            messages_path: get("COMMON_MESSAGES_PATH").filter(|p| !p.is_empty()),
            default_locale: Locale::parse(&default_locale).with_context(|| {
                format!("COMMON_DEFAULT_LOCALE is not a valid locale: {}", default_locale)
            })?,
        })
    }

    /// Create the mapper shared by every request
    pub fn build_mapper(&self) -> Result<ExceptionMapper> {
        let mut messages = BundleMessageSource::builtin();
        if let Some(path) = &self.messages_path {
            let custom = BundleMessageSource::from_json_file(path, self.default_locale.clone())
                .with_context(|| format!("Failed to load message bundles from {}", path))?;
            messages = messages.merge(custom);
        }
        let messages = messages.with_default_locale(self.default_locale.clone());

        Ok(ExceptionMapper::new(self.print_stack_trace, Arc::new(messages))
            .with_default_locale(self.default_locale.clone()))
    }
}
