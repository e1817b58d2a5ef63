//! Admin access configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

const MIN_KEY_LEN: usize = 16;

/// Admin API configuration.
///
/// When `api_key` is unset, catalog writes are open outside production and
/// refused in production.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    /// Bearer token required for catalog writes
    pub api_key: Option<SecretString>,
}

impl AdminConfig {
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::new(key.into())),
        }
    }

    /// True when a non-empty key is configured.
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    /// Validate admin configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.api_key {
            Some(key) if !key.expose_secret().is_empty() && key.expose_secret().len() < MIN_KEY_LEN => {
                Err(ValidationError::AdminKeyTooShort)
            }
            _ => Ok(()),
        }
    }
}
