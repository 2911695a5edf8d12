//! Completion sinks - what happens to each finished conversation.
//!
//! The batch runner drives a single turn loop; the sink decides whether
//! results are persisted one by one (resumable) or collected and written
//! once at the end.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::domain::conversation::{Conversation, FlowType};
use crate::ports::{TranscriptStore, TranscriptStoreError};

#[async_trait]
pub trait ConversationSink: Send {
    /// Catalog index the run should start from.
    async fn resume_offset(&mut self, flow: FlowType) -> Result<usize, TranscriptStoreError>;

    /// Receives one finished conversation.
    async fn accept(
        &mut self,
        flow: FlowType,
        conversation: Conversation,
    ) -> Result<(), TranscriptStoreError>;

    /// Flushes anything pending and returns the stored collection size.
    async fn finish(&mut self, flow: FlowType) -> Result<usize, TranscriptStoreError>;
}

/// Appends every conversation as soon as it is finished.
///
/// Resumes from the stored collection length, so a killed run picks up at
/// the first scenario that was not persisted.
pub struct AppendingSink {
    store: Arc<dyn TranscriptStore>,
}

impl AppendingSink {
    pub fn new(store: Arc<dyn TranscriptStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ConversationSink for AppendingSink {
    async fn resume_offset(&mut self, flow: FlowType) -> Result<usize, TranscriptStoreError> {
        self.store.ensure_exists(flow).await?;
        // Loaded rather than counted: an unparsable document must fail here,
        // before any completion is requested.
        Ok(self.store.load(flow).await?.len())
    }

    async fn accept(
        &mut self,
        flow: FlowType,
        conversation: Conversation,
    ) -> Result<(), TranscriptStoreError> {
        let stored = self.store.append(flow, &conversation).await?;
        debug!(flow = %flow, stored, "conversation appended");
        Ok(())
    }

    async fn finish(&mut self, flow: FlowType) -> Result<usize, TranscriptStoreError> {
        Ok(self.store.count(flow).await)
    }
}

/// Buffers conversations and overwrites the collection on `finish`.
pub struct CollectingSink {
    store: Arc<dyn TranscriptStore>,
    buffer: Vec<Conversation>,
}

impl CollectingSink {
    pub fn new(store: Arc<dyn TranscriptStore>) -> Self {
        Self {
            store,
            buffer: Vec::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

#[async_trait]
impl ConversationSink for CollectingSink {
    async fn resume_offset(&mut self, _flow: FlowType) -> Result<usize, TranscriptStoreError> {
        Ok(0)
    }

    async fn accept(
        &mut self,
        _flow: FlowType,
        conversation: Conversation,
    ) -> Result<(), TranscriptStoreError> {
        self.buffer.push(conversation);
        Ok(())
    }

    async fn finish(&mut self, flow: FlowType) -> Result<usize, TranscriptStoreError> {
        let conversations = std::mem::take(&mut self.buffer);
        self.store.replace_all(flow, &conversations).await?;
        Ok(conversations.len())
    }
}
