//! Transcript Store Port - Interface for persisting generated conversations.
//!
//! One collection per flow type. Collections only grow by whole
//! conversations (`append`) or are replaced wholesale (`replace_all`); a
//! stored conversation is never edited. The length of a collection is the
//! resumption checkpoint for incremental runs.
//!
//! Implementations assume a single writer per flow type.

use async_trait::async_trait;

use crate::domain::conversation::{Conversation, FlowType};

/// Errors that can occur during transcript store operations
#[derive(Debug, thiserror::Error)]
pub enum TranscriptStoreError {
    #[error("Failed to serialize collection: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize collection for {flow}: {message}")]
    DeserializationFailed { flow: FlowType, message: String },

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for persisting conversation collections
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Create an empty collection if none exists. Never touches an existing one.
    async fn ensure_exists(&self, flow: FlowType) -> Result<(), TranscriptStoreError>;

    /// Append one conversation and return the new collection size.
    async fn append(
        &self,
        flow: FlowType,
        conversation: &Conversation,
    ) -> Result<usize, TranscriptStoreError>;

    /// Number of stored conversations.
    ///
    /// Absent or unreadable collections count as zero.
    async fn count(&self, flow: FlowType) -> usize;

    /// Overwrite the collection with exactly `conversations`.
    async fn replace_all(
        &self,
        flow: FlowType,
        conversations: &[Conversation],
    ) -> Result<(), TranscriptStoreError>;

    /// Load every stored conversation, in order.
    async fn load(&self, flow: FlowType) -> Result<Vec<Conversation>, TranscriptStoreError>;
}
