//! Judgment providers.
//!
//! One trait, two implementations: the real OpenAI-compatible client and a
//! scripted fake for tests and offline smoke runs.

pub mod fake;
pub mod openai;

pub use fake::FakeClient;
pub use openai::OpenAiClient;

use crate::errors::ProviderResult;

/// One round-trip to a judgment model.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the instruction pair and return the raw answer text.
    async fn complete(&self, system: &str, user: &str) -> ProviderResult<String>;

    fn provider_name(&self) -> &'static str;
}
