//! Google Gemini API client implementation
//!
//! This module provides a native Gemini `generateContent` client. The same
//! request shape is served by Vertex AI model endpoints, so the client also
//! covers Vertex-hosted models when pointed at a custom base URL.

use crate::config::{LlmConfig, LlmProvider};
use crate::core_types::InlineImage;
use crate::errors::PlanBotError;
use crate::llm::CompletionGateway;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use std::time::Duration;

/// Requests that outlive this are treated as gateway failures; the retry
/// loop needs a bounded attempt, not a hung one.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Google Gemini API client
pub struct GeminiClient {
    api_key: String,
    model: String,
    client: Client,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: Client::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }

    /// Create a new Gemini client with custom base URL
    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            api_key,
            model,
            client: Client::new(),
            base_url,
        }
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiInlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetails,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetails {
    code: u16,
    message: String,
}

impl GeminiClient {
    fn build_request(&self, prompt: &str, image: Option<&InlineImage>) -> GeminiRequest {
        let mut parts = Vec::new();

        // The image precedes the text so the prompt reads as a question about it.
        if let Some(image) = image {
            parts.push(GeminiPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                },
            });
        }
        parts.push(GeminiPart::Text {
            text: prompt.to_string(),
        });

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.4,
                max_output_tokens: 2048,
                top_p: 0.8,
                top_k: 40,
            },
        }
    }

    fn extract_completion_text(&self, response: GeminiResponse) -> Result<String, PlanBotError> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| PlanBotError::LLMError("No candidates in Gemini response".to_string()))?;

        let text_parts: Vec<String> = candidate
            .content
            .parts
            .into_iter()
            .filter_map(|part| match part {
                GeminiPart::Text { text } => Some(text),
                GeminiPart::InlineData { .. } => None,
            })
            .collect();

        if text_parts.is_empty() {
            return Err(PlanBotError::LLMError(
                "Gemini response contained no text parts".to_string(),
            ));
        }

        Ok(text_parts.join(""))
    }
}

#[async_trait]
impl CompletionGateway for GeminiClient {
    async fn complete(
        &self,
        prompt: &str,
        image: Option<&InlineImage>,
    ) -> Result<String, PlanBotError> {
        let request = self.build_request(prompt, image);

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| PlanBotError::LLMError(format!("Gemini API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if let Ok(gemini_error) = serde_json::from_str::<GeminiError>(&error_text) {
                return Err(PlanBotError::LLMError(format!(
                    "Gemini API error {}: {}",
                    gemini_error.error.code, gemini_error.error.message
                )));
            }

            return Err(PlanBotError::LLMError(format!(
                "Gemini API request failed with status {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            PlanBotError::ParsingError(format!("Failed to parse Gemini response: {}", e))
        })?;

        self.extract_completion_text(gemini_response)
    }
}

/// Create a completion gateway from configuration
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn CompletionGateway>, PlanBotError> {
    let api_key = match &config.auth.api_key {
        Some(key) => key.clone(),
        None => match &config.auth.api_key_env {
            Some(env_var) => env::var(env_var).map_err(|_| {
                PlanBotError::ConfigError(format!(
                    "Environment variable {} not found for Gemini API key",
                    env_var
                ))
            })?,
            None => env::var("GEMINI_API_KEY").map_err(|_| {
                PlanBotError::ConfigError("No API key found for Gemini. Set GEMINI_API_KEY environment variable or provide api_key in config".to_string())
            })?,
        },
    };

    let client = match &config.provider {
        LlmProvider::Gemini => GeminiClient::new(api_key, config.model.clone()),
        LlmProvider::Custom { base_url } => {
            GeminiClient::with_base_url(api_key, config.model.clone(), base_url.clone())
        }
    };

    Ok(Arc::new(client))
}
