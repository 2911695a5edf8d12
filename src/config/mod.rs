//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `AMELIA_GEN` prefix and nested values use double underscores as separators.
//!
//! The plain `OPENROUTER_*` variables used by earlier generator scripts are
//! honoured as defaults; a prefixed variable always wins.
//!
//! # Example
//!
//! ```no_run
//! use amelia_gen::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Using model {}", config.ai.model);
//! ```

mod ai;
mod error;
mod generation;
mod storage;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use generation::GenerationConfig;
pub use storage::{CatalogConfig, PromptConfig, StorageConfig};

use serde::Deserialize;

/// Environment variable prefix for all settings
pub const ENV_PREFIX: &str = "AMELIA_GEN";

/// Unprefixed variables mapped onto config keys as defaults
const LEGACY_VARIABLES: [(&str, &str); 5] = [
    ("OPENROUTER_API_KEY", "ai.api_key"),
    ("OPENROUTER_MODEL", "ai.model"),
    ("OPENROUTER_BASE_URL", "ai.base_url"),
    ("OPENROUTER_HTTP_REFERER", "ai.http_referer"),
    ("OPENROUTER_APP_TITLE", "ai.app_title"),
];

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Completion provider (OpenRouter)
    #[serde(default)]
    pub ai: AiConfig,

    /// Turn pacing and reply seed
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Transcript document paths
    #[serde(default)]
    pub storage: StorageConfig,

    /// Agent prompt template
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Scenario catalog override
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Applies legacy `OPENROUTER_*` variables as defaults
    /// 3. Reads environment variables with `AMELIA_GEN` prefix
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `AMELIA_GEN__AI__MODEL=openai/gpt-4o` -> `ai.model = openai/gpt-4o`
    /// - `AMELIA_GEN__GENERATION__PACING_MS=0` -> `generation.pacing_ms = 0`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    /// Missing values are reported by [`AppConfig::validate()`].
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Same as [`AppConfig::load()`] without reading `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        for (variable, key) in LEGACY_VARIABLES {
            if let Ok(value) = std::env::var(variable) {
                builder = builder.set_default(key, value)?;
            }
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::path::PathBuf;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const TOUCHED: [&str; 7] = [
        "OPENROUTER_API_KEY",
        "OPENROUTER_MODEL",
        "AMELIA_GEN__AI__API_KEY",
        "AMELIA_GEN__AI__MODEL",
        "AMELIA_GEN__GENERATION__PACING_MS",
        "AMELIA_GEN__STORAGE__CRISIS_PATH",
        "AMELIA_GEN__CATALOG__PATH",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for variable in TOUCHED {
            env::remove_var(variable);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("AMELIA_GEN__AI__API_KEY", "sk-or-prefixed");
        env::set_var("AMELIA_GEN__GENERATION__PACING_MS", "250");
        env::set_var("AMELIA_GEN__STORAGE__CRISIS_PATH", "out/crisis.json");
        let result = AppConfig::from_env();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.ai.api_key.unwrap().expose_secret(), "sk-or-prefixed");
        assert_eq!(config.generation.pacing_ms, 250);
        assert_eq!(config.storage.crisis_path, PathBuf::from("out/crisis.json"));
    }

    #[test]
    fn test_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::from_env();

        let config = result.unwrap();
        assert!(config.ai.api_key.is_none());
        assert_eq!(config.ai.model, "anthropic/claude-3.5-sonnet");
        assert_eq!(config.generation.pacing_ms, 1000);
        assert_eq!(
            config.prompt.template_path,
            PathBuf::from("prompts/amelia_user_flow.md")
        );
        assert!(config.catalog.path.is_none());
    }

    #[test]
    fn test_missing_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::from_env().unwrap();

        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_legacy_variables_are_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("OPENROUTER_API_KEY", "sk-or-legacy");
        env::set_var("OPENROUTER_MODEL", "openai/gpt-4o-mini");
        let result = AppConfig::from_env();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.api_key.unwrap().expose_secret(), "sk-or-legacy");
        assert_eq!(config.ai.model, "openai/gpt-4o-mini");
    }

    #[test]
    fn test_prefixed_variable_overrides_legacy() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("OPENROUTER_MODEL", "openai/gpt-4o-mini");
        env::set_var("AMELIA_GEN__AI__MODEL", "anthropic/claude-3-haiku");
        env::set_var("AMELIA_GEN__AI__API_KEY", "sk-or-xxx");
        let result = AppConfig::from_env();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.model, "anthropic/claude-3-haiku");
        assert!(config.validate().is_ok());
    }
}
