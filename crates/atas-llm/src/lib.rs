//! LLM access for drafting meeting minutes.
//!
//! [`ChatModel`] is the seam between minutes generation and the provider, so
//! the server can be exercised without a network.

mod client;
mod generator;
mod prompt;

pub use client::LlmClient;
pub use generator::{file_name, AtaGenerator, DEFAULT_TITLE};
pub use prompt::build_prompt;

use async_trait::async_trait;
use atas_core::AtaError;

/// A chat-completion endpoint that answers a single user prompt.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Sends `prompt` as the only user message and returns the reply text.
    async fn complete(&self, prompt: &str) -> Result<String, AtaError>;
}
