//! File locations: transcript documents, prompt template, scenario catalog

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Transcript document paths
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_checkin_path")]
    pub checkin_path: PathBuf,

    #[serde(default = "default_crisis_path")]
    pub crisis_path: PathBuf,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.checkin_path == self.crisis_path {
            return Err(ValidationError::SharedStoragePath);
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            checkin_path: default_checkin_path(),
            crisis_path: default_crisis_path(),
        }
    }
}

fn default_checkin_path() -> PathBuf {
    PathBuf::from("conversations_check_in_flow.json")
}

fn default_crisis_path() -> PathBuf {
    PathBuf::from("conversations_crisis_flow.json")
}

/// Agent prompt template location
#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template_path: default_template_path(),
        }
    }
}

fn default_template_path() -> PathBuf {
    PathBuf::from("prompts/amelia_user_flow.md")
}

/// Scenario catalog override; the compiled-in catalog is used when unset
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    pub path: Option<PathBuf>,
}
