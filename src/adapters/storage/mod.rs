//! Storage Adapters
//!
//! Implementations of the TranscriptStore port.
//!
//! ## Available Adapters
//!
//! - **JsonTranscriptStore** - One JSON document per flow type on disk
//! - **InMemoryTranscriptStore** - Stores collections in memory (testing)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{InMemoryTranscriptStore, JsonTranscriptStore};
//!
//! // Production: JSON documents
//! let store = JsonTranscriptStore::in_dir("./data");
//!
//! // Testing: in-memory storage
//! let store = InMemoryTranscriptStore::new();
//! ```

mod in_memory_transcript_store;
mod json_transcript_store;

pub use in_memory_transcript_store::InMemoryTranscriptStore;
pub use json_transcript_store::{JsonTranscriptStore, CHECKIN_FILE_NAME, CRISIS_FILE_NAME};
