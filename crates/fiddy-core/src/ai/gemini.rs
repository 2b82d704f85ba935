use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::TextGenerator;
use crate::config::Config;
use crate::error::RemoteError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

// Every level is optional so a missing field is reported as a shape
// error instead of a generic decode failure.
#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    parts: Option<Vec<GeminiResponsePart>>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

/// Pull `candidates[0].content.parts[0].text` out of a response body
pub fn extract_text(body: &str) -> Result<String, RemoteError> {
    let response: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| RemoteError::UnexpectedResponseShape(format!("malformed JSON: {}", e)))?;

    let candidate = response
        .candidates
        .ok_or_else(|| RemoteError::UnexpectedResponseShape("missing candidates".to_string()))?
        .into_iter()
        .next()
        .ok_or_else(|| RemoteError::UnexpectedResponseShape("empty candidates".to_string()))?;

    candidate
        .content
        .and_then(|c| c.parts)
        .and_then(|parts| parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| RemoteError::UnexpectedResponseShape("missing candidate text".to_string()))
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: Option<&str>, model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.to_string(),
            api_key: api_key.map(str::to_string),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, RemoteError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        debug!(
            model = %config.model(),
            base_url = %config.base_url(),
            has_key = config.resolve_api_key().is_some(),
            "GeminiClient::from_config"
        );

        Ok(Self {
            client,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            model: config.model().to_string(),
            api_key: config.resolve_api_key(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn query(&self, prompt: &str) -> Result<String, RemoteError> {
        let api_key = self.api_key.as_deref().ok_or(RemoteError::MissingCredential)?;
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "query: sending");

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "query: service rejected request");
            return Err(RemoteError::ServiceRejected {
                status: status.as_u16(),
                body,
            });
        }

        let text = extract_text(&body)?;
        debug!(response_len = text.len(), "query: received");
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, RemoteError> {
        self.query(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_returns_first_candidate_verbatim() {
        let body = r#"{"candidates":[
            {"content":{"parts":[{"text":"  **Day 1**\nOats  "},{"text":"ignored"}]}},
            {"content":{"parts":[{"text":"second"}]}}
        ]}"#;
        assert_eq!(extract_text(body).unwrap(), "  **Day 1**\nOats  ");
    }

    #[test]
    fn test_extract_text_rejects_missing_candidates() {
        assert!(matches!(
            extract_text(r#"{"promptFeedback":{}}"#),
            Err(RemoteError::UnexpectedResponseShape(_))
        ));
    }

    #[test]
    fn test_extract_text_rejects_empty_candidates() {
        assert!(matches!(
            extract_text(r#"{"candidates":[]}"#),
            Err(RemoteError::UnexpectedResponseShape(_))
        ));
    }

    #[test]
    fn test_extract_text_rejects_missing_nested_text() {
        for body in [
            r#"{"candidates":[{}]}"#,
            r#"{"candidates":[{"content":{}}]}"#,
            r#"{"candidates":[{"content":{"parts":[]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{}}]}}]}"#,
        ] {
            assert!(
                matches!(extract_text(body), Err(RemoteError::UnexpectedResponseShape(_))),
                "accepted {}",
                body
            );
        }
    }

    #[test]
    fn test_extract_text_rejects_malformed_json() {
        assert!(matches!(
            extract_text("<html>oops</html>"),
            Err(RemoteError::UnexpectedResponseShape(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: "hello".to_string(),
                }],
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, serde_json::json!({"contents":[{"parts":[{"text":"hello"}]}]}));
    }

    #[tokio::test]
    async fn test_query_without_key_is_missing_credential() {
        let client = GeminiClient::new(None, DEFAULT_MODEL);
        assert!(!client.has_credential());
        assert_eq!(client.query("hi").await, Err(RemoteError::MissingCredential));
    }
}
