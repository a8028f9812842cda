//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `POBO_USERNAME` - Account e-mail used for login
//! - `POBO_PASSWORD` - Account password
//!
//! ## Optional
//! - `POBO_LOCALE` - Market code: `CZ`, `HU` or `SPACE` (default: `CZ`)

use thiserror::Error;

use crate::locale::Locale;
use crate::session::Credentials;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unsupported locale: {0}")]
    InvalidLocale(String),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials: Credentials,
    pub locale: Locale,
}

impl ClientConfig {
    pub fn new(credentials: Credentials, locale: Locale) -> Self {
        Self {
            credentials,
            locale,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; `from_env` uses the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));

        let username = required("POBO_USERNAME")?;
        let password = required("POBO_PASSWORD")?;
        let locale = match lookup("POBO_LOCALE") {
            Some(code) => code
                .parse()
                .map_err(|_| ConfigError::InvalidLocale(code.clone()))?,
            None => Locale::default(),
        };

        Ok(Self::new(Credentials::new(username, password), locale))
    }
}
