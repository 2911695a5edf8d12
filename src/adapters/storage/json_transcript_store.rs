//! JSON file Transcript Store Adapter
//!
//! One document per flow type, shaped `{"conversations": [...]}`, written with
//! 4-space indentation and literal (unescaped) non-ASCII text. Every write
//! goes to a sibling `.tmp` file first and is renamed over the document, so an
//! interrupted write leaves the previous collection intact.

use async_trait::async_trait;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::domain::conversation::{Conversation, FlowType};
use crate::ports::{TranscriptStore, TranscriptStoreError};

/// Default document name for check-in conversations.
pub const CHECKIN_FILE_NAME: &str = "conversations_check_in_flow.json";

/// Default document name for crisis-log conversations.
pub const CRISIS_FILE_NAME: &str = "conversations_crisis_flow.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct CollectionDocument {
    conversations: Vec<Conversation>,
}

#[derive(Debug, Deserialize)]
struct CollectionLength {
    conversations: Vec<IgnoredAny>,
}

/// File-based storage for conversation collections
#[derive(Debug, Clone)]
pub struct JsonTranscriptStore {
    checkin_path: PathBuf,
    crisis_path: PathBuf,
}

impl JsonTranscriptStore {
    /// Create a store with explicit document paths
    pub fn new(checkin_path: impl Into<PathBuf>, crisis_path: impl Into<PathBuf>) -> Self {
        Self {
            checkin_path: checkin_path.into(),
            crisis_path: crisis_path.into(),
        }
    }

    /// Create a store using the default document names inside `dir`
    ///
    /// # Example
    /// ```ignore
    /// let store = JsonTranscriptStore::in_dir("./data");
    /// ```
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(CHECKIN_FILE_NAME), dir.join(CRISIS_FILE_NAME))
    }

    /// Document path for a flow
    pub fn path_for(&self, flow: FlowType) -> &Path {
        match flow {
            FlowType::Checkin => &self.checkin_path,
            FlowType::Crisis => &self.crisis_path,
        }
    }

    async fn read_document(&self, flow: FlowType) -> Result<CollectionDocument, TranscriptStoreError> {
        let path = self.path_for(flow);

        if !path.exists() {
            return Ok(CollectionDocument::default());
        }

        let json = fs::read_to_string(path)
            .await
            .map_err(|e| TranscriptStoreError::IoError(e.to_string()))?;

        serde_json::from_str(&json).map_err(|e| TranscriptStoreError::DeserializationFailed {
            flow,
            message: e.to_string(),
        })
    }

    async fn write_document(
        &self,
        flow: FlowType,
        document: &CollectionDocument,
    ) -> Result<(), TranscriptStoreError> {
        let path = self.path_for(flow);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| TranscriptStoreError::IoError(e.to_string()))?;
        }

        let bytes = to_indented_json(document)?;
        let tmp_path = path.with_extension("json.tmp");

        fs::write(&tmp_path, bytes)
            .await
            .map_err(|e| TranscriptStoreError::IoError(e.to_string()))?;
        fs::rename(&tmp_path, path)
            .await
            .map_err(|e| TranscriptStoreError::IoError(e.to_string()))?;

        debug!(flow = %flow, path = %path.display(), count = document.conversations.len(), "collection written");
        Ok(())
    }
}

/// Serializes with 4-space indentation.
fn to_indented_json<T: Serialize>(value: &T) -> Result<Vec<u8>, TranscriptStoreError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| TranscriptStoreError::SerializationFailed(e.to_string()))?;
    Ok(buf)
}

#[async_trait]
impl TranscriptStore for JsonTranscriptStore {
    async fn ensure_exists(&self, flow: FlowType) -> Result<(), TranscriptStoreError> {
        if self.path_for(flow).exists() {
            return Ok(());
        }
        self.write_document(flow, &CollectionDocument::default()).await
    }

    async fn append(
        &self,
        flow: FlowType,
        conversation: &Conversation,
    ) -> Result<usize, TranscriptStoreError> {
        let mut document = self.read_document(flow).await?;
        document.conversations.push(conversation.clone());
        self.write_document(flow, &document).await?;
        Ok(document.conversations.len())
    }

    async fn count(&self, flow: FlowType) -> usize {
        let Ok(json) = fs::read_to_string(self.path_for(flow)).await else {
            return 0;
        };
        serde_json::from_str::<CollectionLength>(&json)
            .map(|doc| doc.conversations.len())
            .unwrap_or(0)
    }

    async fn replace_all(
        &self,
        flow: FlowType,
        conversations: &[Conversation],
    ) -> Result<(), TranscriptStoreError> {
        let document = CollectionDocument {
            conversations: conversations.to_vec(),
        };
        self.write_document(flow, &document).await
    }

    async fn load(&self, flow: FlowType) -> Result<Vec<Conversation>, TranscriptStoreError> {
        Ok(self.read_document(flow).await?.conversations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::Turn;
    use tempfile::TempDir;

    fn conversation(opening: &str) -> Conversation {
        let mut conversation = Conversation::opened_by(opening);
        conversation.push(Turn::agent("hola, ¿cómo te sientes del 1 al 10?"));
        conversation
    }

    #[tokio::test]
    async fn count_is_zero_when_document_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonTranscriptStore::in_dir(temp_dir.path());

        assert_eq!(store.count(FlowType::Checkin).await, 0);
        assert_eq!(store.count(FlowType::Crisis).await, 0);
    }

    #[tokio::test]
    async fn count_is_zero_when_document_is_unparsable() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonTranscriptStore::in_dir(temp_dir.path());
        std::fs::write(store.path_for(FlowType::Crisis), "{ not json").unwrap();

        assert_eq!(store.count(FlowType::Crisis).await, 0);
    }

    #[tokio::test]
    async fn ensure_exists_writes_empty_collection() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonTranscriptStore::in_dir(temp_dir.path());

        store.ensure_exists(FlowType::Checkin).await.unwrap();

        let raw = std::fs::read_to_string(store.path_for(FlowType::Checkin)).unwrap();
        assert_eq!(raw, "{\n    \"conversations\": []\n}");
    }

    #[tokio::test]
    async fn ensure_exists_twice_keeps_existing_entries() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonTranscriptStore::in_dir(temp_dir.path());

        store.ensure_exists(FlowType::Checkin).await.unwrap();
        store.append(FlowType::Checkin, &conversation("hola")).await.unwrap();
        store.ensure_exists(FlowType::Checkin).await.unwrap();
        store.ensure_exists(FlowType::Checkin).await.unwrap();

        assert_eq!(store.count(FlowType::Checkin).await, 1);
    }

    #[tokio::test]
    async fn append_grows_collection_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonTranscriptStore::in_dir(temp_dir.path());

        assert_eq!(store.append(FlowType::Crisis, &conversation("uno")).await.unwrap(), 1);
        assert_eq!(store.append(FlowType::Crisis, &conversation("dos")).await.unwrap(), 2);

        let loaded = store.load(FlowType::Crisis).await.unwrap();
        assert_eq!(loaded, vec![conversation("uno"), conversation("dos")]);
        assert_eq!(store.count(FlowType::Checkin).await, 0);
    }

    #[tokio::test]
    async fn documents_use_four_space_indent_and_literal_accents() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonTranscriptStore::in_dir(temp_dir.path());

        store
            .append(FlowType::Checkin, &Conversation::opened_by("¿cómo estás?"))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.path_for(FlowType::Checkin)).unwrap();
        let expected = "{\n    \"conversations\": [\n        [\n            {\n                \"user\": \"¿cómo estás?\"\n            }\n        ]\n    ]\n}";
        assert_eq!(raw, expected);
    }

    #[tokio::test]
    async fn replace_all_overwrites_collection() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonTranscriptStore::in_dir(temp_dir.path());

        store.append(FlowType::Checkin, &conversation("viejo")).await.unwrap();
        store
            .replace_all(FlowType::Checkin, &[conversation("a"), conversation("b"), conversation("c")])
            .await
            .unwrap();

        let loaded = store.load(FlowType::Checkin).await.unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0], conversation("a"));
    }

    #[tokio::test]
    async fn append_to_corrupt_document_fails_without_overwriting() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonTranscriptStore::in_dir(temp_dir.path());
        let path = store.path_for(FlowType::Checkin).to_path_buf();
        std::fs::write(&path, "garbage").unwrap();

        let result = store.append(FlowType::Checkin, &conversation("hola")).await;

        assert!(matches!(
            result,
            Err(TranscriptStoreError::DeserializationFailed { flow: FlowType::Checkin, .. })
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "garbage");
    }

    #[tokio::test]
    async fn writes_create_missing_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonTranscriptStore::in_dir(temp_dir.path().join("nested/out"));

        store.append(FlowType::Crisis, &conversation("hola")).await.unwrap();

        assert_eq!(store.count(FlowType::Crisis).await, 1);
        assert!(!store.path_for(FlowType::Crisis).with_extension("json.tmp").exists());
    }
}
