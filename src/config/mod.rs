#[cfg(feature = "cli")]
pub mod cli;
pub mod manifest;

use crate::utils::error::{ExportError, Result};
use crate::utils::validation::{validate_required_field, validate_url, Validate};
use std::env;
use std::time::Duration;

pub const API_KEY_VAR: &str = "AIRTABLE_API_KEY";
pub const BASE_ID_VAR: &str = "AIRTABLE_BASE_ID";
pub const API_URL_VAR: &str = "AIRTABLE_API_URL";
pub const TIMEOUT_VAR: &str = "AIRTABLE_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";

/// Credentials and endpoint for the Airtable API.
///
/// Built once at startup and handed to the client by reference.
#[derive(Clone)]
pub struct AirtableConfig {
    pub api_key: String,
    pub base_id: String,
    pub api_url: String,
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for AirtableConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableConfig")
            .field("api_key", &"<redacted>")
            .field("base_id", &self.base_id)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AirtableConfig {
    pub fn new(api_key: impl Into<String>, base_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_id: base_id.into(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: None,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = validate_required_field(API_KEY_VAR, lookup(API_KEY_VAR))?;
        let base_id = validate_required_field(BASE_ID_VAR, lookup(BASE_ID_VAR))?;

        let api_url = lookup(API_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    ExportError::InvalidConfigValueError {
                        field: TIMEOUT_VAR.to_string(),
                        value: raw.clone(),
                        reason: "Expected a whole number of seconds".to_string(),
                    }
                })?;
                if secs == 0 {
                    return Err(ExportError::InvalidConfigValueError {
                        field: TIMEOUT_VAR.to_string(),
                        value: raw,
                        reason: "Value must be at least 1".to_string(),
                    });
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let config = Self {
            api_key,
            base_id,
            api_url,
            timeout,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Validate for AirtableConfig {
    fn validate(&self) -> Result<()> {
        validate_url(API_URL_VAR, &self.api_url)?;

        if self.base_id.contains('/') {
            return Err(ExportError::InvalidConfigValueError {
                field: BASE_ID_VAR.to_string(),
                value: self.base_id.clone(),
                reason: "Base id cannot contain '/'".to_string(),
            });
        }

        tracing::debug!("Airtable configuration validation passed");
        Ok(())
    }
}
