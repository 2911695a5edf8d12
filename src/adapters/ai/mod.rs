//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `OpenRouterProvider` - OpenRouter chat completions (OpenAI-compatible)
//! - `MockAIProvider` - Configurable mock for testing

mod mock_provider;
mod openrouter_provider;

pub use mock_provider::{MockAIProvider, MockError, MockResponse, MOCK_DEFAULT_REPLY};
pub use openrouter_provider::{OpenRouterConfig, OpenRouterProvider};
