//! In-Memory Transcript Store Adapter
//!
//! Keeps collections in memory. Useful for tests and dry runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{Conversation, FlowType};
use crate::ports::{TranscriptStore, TranscriptStoreError};

/// In-memory storage for conversation collections
#[derive(Debug, Clone, Default)]
pub struct InMemoryTranscriptStore {
    collections: Arc<RwLock<HashMap<FlowType, Vec<Conversation>>>>,
}

impl InMemoryTranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a collection has been created for `flow`
    pub async fn exists(&self, flow: FlowType) -> bool {
        self.collections.read().await.contains_key(&flow)
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.collections.write().await.clear();
    }
}

#[async_trait]
impl TranscriptStore for InMemoryTranscriptStore {
    async fn ensure_exists(&self, flow: FlowType) -> Result<(), TranscriptStoreError> {
        self.collections.write().await.entry(flow).or_default();
        Ok(())
    }

    async fn append(
        &self,
        flow: FlowType,
        conversation: &Conversation,
    ) -> Result<usize, TranscriptStoreError> {
        let mut collections = self.collections.write().await;
        let collection = collections.entry(flow).or_default();
        collection.push(conversation.clone());
        Ok(collection.len())
    }

    async fn count(&self, flow: FlowType) -> usize {
        self.collections
            .read()
            .await
            .get(&flow)
            .map_or(0, Vec::len)
    }

    async fn replace_all(
        &self,
        flow: FlowType,
        conversations: &[Conversation],
    ) -> Result<(), TranscriptStoreError> {
        self.collections
            .write()
            .await
            .insert(flow, conversations.to_vec());
        Ok(())
    }

    async fn load(&self, flow: FlowType) -> Result<Vec<Conversation>, TranscriptStoreError> {
        Ok(self
            .collections
            .read()
            .await
            .get(&flow)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_exists_is_idempotent() {
        let store = InMemoryTranscriptStore::new();

        store.ensure_exists(FlowType::Checkin).await.unwrap();
        store
            .append(FlowType::Checkin, &Conversation::opened_by("hola"))
            .await
            .unwrap();
        store.ensure_exists(FlowType::Checkin).await.unwrap();

        assert!(store.exists(FlowType::Checkin).await);
        assert_eq!(store.count(FlowType::Checkin).await, 1);
    }

    #[tokio::test]
    async fn flows_are_independent() {
        let store = InMemoryTranscriptStore::new();

        store
            .append(FlowType::Crisis, &Conversation::opened_by("crisis"))
            .await
            .unwrap();

        assert_eq!(store.count(FlowType::Crisis).await, 1);
        assert_eq!(store.count(FlowType::Checkin).await, 0);
        assert!(!store.exists(FlowType::Checkin).await);
    }

    #[tokio::test]
    async fn replace_all_and_clear() {
        let store = InMemoryTranscriptStore::new();
        let conversations = vec![Conversation::opened_by("a"), Conversation::opened_by("b")];

        store.replace_all(FlowType::Checkin, &conversations).await.unwrap();
        assert_eq!(store.load(FlowType::Checkin).await.unwrap(), conversations);

        store.clear().await;
        assert_eq!(store.count(FlowType::Checkin).await, 0);
    }
}
