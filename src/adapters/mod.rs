//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Chat-completion providers (OpenRouter, mock)
//! - `storage` - Transcript stores (JSON files, in-memory)

pub mod ai;
pub mod storage;

pub use ai::{MockAIProvider, MockError, OpenRouterConfig, OpenRouterProvider};
pub use storage::{InMemoryTranscriptStore, JsonTranscriptStore};
