//! Application layer - runs scenarios and persists the results.
//!
//! - `orchestrator` - the turn loop for one scenario
//! - `batch_runner` - iterates a catalog in incremental or batch mode
//! - `sink` - where finished conversations go
//! - `prompt` - the agent's system prompt template

mod batch_runner;
mod orchestrator;
mod prompt;
mod sink;

pub use batch_runner::{fallback_conversation, BatchError, BatchRunner, FlowReport, FlowStatus, RunMode};
pub use orchestrator::{
    ConversationOrchestrator, GeneratedConversation, OrchestratorError, RunOutcome, DEFAULT_PACING,
};
pub use prompt::{PromptError, PromptTemplate};
pub use sink::{AppendingSink, CollectingSink, ConversationSink};
