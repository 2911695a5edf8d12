//! Completion provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Upper bound for `max_retries`
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Completion provider configuration (OpenRouter)
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// OpenRouter API key
    pub api_key: Option<Secret<String>>,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier, e.g. `anthropic/claude-3.5-sonnet`
    #[serde(default = "default_model")]
    pub model: String,

    /// Sent as `HTTP-Referer`
    #[serde(default = "default_http_referer")]
    pub http_referer: String,

    /// Sent as `X-Title`
    #[serde(default = "default_app_title")]
    pub app_title: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on transient failures
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Validate provider configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired(
                "OPENROUTER_API_KEY (or AMELIA_GEN__AI__API_KEY)",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(ValidationError::TooManyRetries(MAX_RETRIES_LIMIT));
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::EmptyModel);
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            http_referer: default_http_referer(),
            app_title: default_app_title(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "anthropic/claude-3.5-sonnet".to_string()
}

fn default_http_referer() -> String {
    "http://localhost".to_string()
}

fn default_app_title() -> String {
    "Amelia Batch Generator".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}
