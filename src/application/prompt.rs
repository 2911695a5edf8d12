//! Agent prompt template.
//!
//! Loaded once per process. Each request's system instruction is the template
//! followed by the current flow-state annotation.

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("could not read prompt template {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("prompt template {path} is empty")]
    Empty { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Reads the template from disk. A missing or blank file is an error.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PromptError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PromptError::Unreadable {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        if text.trim().is_empty() {
            return Err(PromptError::Empty {
                path: path.display().to_string(),
            });
        }

        Ok(Self { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// System instruction for one request.
    pub fn system_instruction(&self, annotation: &str) -> String {
        format!("{}\n\nCurrent state: {}", self.text, annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn system_instruction_appends_state() {
        let prompt = PromptTemplate::new("Eres Amelia.");
        assert_eq!(
            prompt.system_instruction(r#"{"flow":"crisis","step":"awaiting_activator"}"#),
            "Eres Amelia.\n\nCurrent state: {\"flow\":\"crisis\",\"step\":\"awaiting_activator\"}"
        );
    }

    #[tokio::test]
    async fn load_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("amelia_user_flow.md");
        std::fs::write(&path, "# Amelia\n").unwrap();

        let prompt = PromptTemplate::load(&path).await.unwrap();
        assert_eq!(prompt.text(), "# Amelia\n");
    }

    #[tokio::test]
    async fn load_fails_for_missing_file() {
        let err = PromptTemplate::load("/nonexistent/amelia_user_flow.md").await.unwrap_err();
        assert!(matches!(err, PromptError::Unreadable { .. }));
        assert!(err.to_string().contains("amelia_user_flow.md"));
    }

    #[tokio::test]
    async fn load_fails_for_blank_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blank.md");
        std::fs::write(&path, "  \n").unwrap();

        assert!(matches!(
            PromptTemplate::load(&path).await,
            Err(PromptError::Empty { .. })
        ));
    }
}
