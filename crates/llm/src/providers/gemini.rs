//! Google Gemini LLM provider implementation.
//!
//! Uses the Generative Language REST API:
//! https://ai.google.dev/api/generate-content
//!
//! A single long-lived reqwest client is shared across calls for connection
//! pooling; both pipeline stages go through the same client instance.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use finstep_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini generateContent request format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Gemini generateContent response format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

/// Gemini LLM client (connection-pooled).
pub struct GeminiClient {
    /// Base URL for the Generative Language API
    base_url: String,

    /// API key, appended as a query parameter
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new Gemini client against the public API endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a new Gemini client with a custom base URL.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Convert LlmRequest to Gemini format.
    fn to_gemini_request(&self, request: &LlmRequest) -> GeminiRequest {
        let generation_config = if request.temperature.is_some()
            || request.top_p.is_some()
            || request.max_tokens.is_some()
        {
            Some(GenerationConfig {
                temperature: request.temperature,
                top_p: request.top_p,
                max_output_tokens: request.max_tokens,
            })
        } else {
            None
        };

        GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config,
            system_instruction: request.system.as_ref().map(|system| Content {
                parts: vec![Part {
                    text: system.clone(),
                }],
            }),
        }
    }

    /// Convert Gemini response to LlmResponse.
    fn convert_response(&self, model: &str, response: GeminiResponse) -> AppResult<LlmResponse> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Llm("No candidates in Gemini response".to_string()))?;

        let content = candidate
            .content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");

        if content.is_empty() {
            return Err(AppError::Llm("Empty response from Gemini".to_string()));
        }

        let usage = response
            .usage_metadata
            .map(|u| LlmUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        let done = matches!(candidate.finish_reason.as_deref(), Some("STOP") | None);

        Ok(LlmResponse {
            content,
            model: model.to_string(),
            usage,
            done,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for GeminiClient {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!(model = %request.model, "Sending completion request to Gemini");
        tracing::debug!("Request: {:?}", request);

        let gemini_request = self.to_gemini_request(request);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, request.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Gemini: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Gemini response: {}", e)))?;

        tracing::info!("Received completion from Gemini");

        self.convert_response(&request.model, gemini_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_client_creation() {
        let client = GeminiClient::new("test-key");
        assert_eq!(client.provider_name(), "gemini");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_gemini_request_conversion() {
        let client = GeminiClient::new("test-key");
        let request = LlmRequest::new("What is an ISA?", "gemini-2.5-flash")
            .with_temperature(0.7)
            .with_system("You are a mentor");

        let gemini_req = client.to_gemini_request(&request);
        assert_eq!(gemini_req.contents.len(), 1);
        assert_eq!(gemini_req.contents[0].parts[0].text, "What is an ISA?");
        assert!(gemini_req.system_instruction.is_some());

        let config = gemini_req.generation_config.unwrap();
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.max_output_tokens, None);
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let client = GeminiClient::new("test-key");
        let request = LlmRequest::new("hi", "gemini-2.5-flash")
            .with_max_tokens(256)
            .with_system("sys");

        let json = serde_json::to_string(&client.to_gemini_request(&request)).unwrap();
        assert!(json.contains("\"systemInstruction\""));
        assert!(json.contains("\"maxOutputTokens\":256"));
        assert!(json.contains("\"generationConfig\""));
    }

    #[test]
    fn test_convert_response_extracts_first_candidate() {
        let client = GeminiClient::new("test-key");
        let response = GeminiResponse {
            candidates: vec![Candidate {
                content: Content {
                    parts: vec![Part {
                        text: "An ISA is a savings account.".to_string(),
                    }],
                },
                finish_reason: Some("STOP".to_string()),
            }],
            usage_metadata: Some(UsageMetadata {
                prompt_token_count: 10,
                candidates_token_count: 8,
            }),
        };

        let converted = client
            .convert_response("gemini-2.5-flash", response)
            .unwrap();
        assert_eq!(converted.content, "An ISA is a savings account.");
        assert_eq!(converted.usage.total_tokens, 18);
        assert!(converted.done);
    }

    #[test]
    fn test_convert_response_no_candidates() {
        let client = GeminiClient::new("test-key");
        let response = GeminiResponse {
            candidates: vec![],
            usage_metadata: None,
        };

        let err = client
            .convert_response("gemini-2.5-flash", response)
            .unwrap_err();
        assert!(err.to_string().contains("No candidates"));
    }
}
