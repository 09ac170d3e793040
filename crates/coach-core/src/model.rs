//! Text-generation capability
//!
//! The analyzer consumes the model through the [`TextModel`] trait: one
//! prompt in, free text out. [`GeminiModel`] is the production
//! implementation against the Google Generative Language API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoachError;
use crate::Result;

/// Default generateContent endpoint.
pub const DEFAULT_GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";

/// A prompt-in, free-text-out generative model.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Generate a completion for `prompt`. The returned text carries no
    /// structural guarantees; callers must parse it defensively.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

/// Google Generative Language API client.
pub struct GeminiModel {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiModel {
    /// Create a client against the default gemini-pro endpoint.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_endpoint(api_key, DEFAULT_GEMINI_ENDPOINT)
    }

    /// Create a client against a specific generateContent endpoint.
    pub fn with_endpoint(api_key: &str, endpoint: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mr-coach/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoachError::Config(e.to_string()))?;

        Ok(GeminiModel {
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }
}

#[async_trait]
impl TextModel for GeminiModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}?key={}", self.endpoint, self.api_key);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!(endpoint = %self.endpoint, "POST generateContent");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CoachError::Model(e.to_string()))?
            .error_for_status()
            .map_err(|e| CoachError::Model(e.to_string()))?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CoachError::Model(e.to_string()))?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| CoachError::Model("response carried no candidates".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_matches_generate_content_wire_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "review this".to_string(),
                }],
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "review this");
    }

    #[test]
    fn response_text_is_first_candidate_first_part() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "looks fine"}, {"text": "ignored"}]}}
            ]
        }"#;

        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text);
        assert_eq!(text.as_deref(), Some("looks fine"));
    }

    #[test]
    fn empty_candidate_list_deserializes() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(response.candidates.is_empty());
    }
}
