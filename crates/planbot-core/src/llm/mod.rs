//! Completion gateway abstraction and provider integration.
//!
//! Defines the gateway trait the generation loop talks to, plus the Gemini
//! `generateContent` client the service ships with. The gateway is a plain
//! request/response text completion; multimodality is limited to a single
//! inline image attached to the prompt.

use crate::core_types::InlineImage;
use crate::errors::PlanBotError;
use async_trait::async_trait;

pub mod gemini;

pub use gemini::GeminiClient;

#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Turn a prompt (and optionally one inline image) into a text completion.
    async fn complete(
        &self,
        prompt: &str,
        image: Option<&InlineImage>,
    ) -> Result<String, PlanBotError>;
}
