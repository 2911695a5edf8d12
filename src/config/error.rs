//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("max_retries must be at most {0}")]
    TooManyRetries(u32),

    #[error("Model name must not be empty")]
    EmptyModel,

    #[error("Invalid base URL format")]
    InvalidBaseUrl,

    #[error("Storage paths for check-in and crisis must differ")]
    SharedStoragePath,
}
