//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Chat-completion provider (OpenRouter in production)
//! - `TranscriptStore` - Durable per-flow conversation collections

mod ai_provider;
mod transcript_store;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, TokenUsage,
};
pub use transcript_store::{TranscriptStore, TranscriptStoreError};
