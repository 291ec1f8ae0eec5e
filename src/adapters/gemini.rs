//! Gemini generate-content adapter.
//!
//! Single-turn: conversation history is accepted but never forwarded, and
//! the API key travels as the `key` query parameter rather than a header.

use super::upstream::{build_upstream_request, send_json, UpstreamAuth};
use super::{text_or_fallback, Adapter, ChatMessage, Completion, Provider};
use super::{MAX_TOKENS, TEMPERATURE};
use crate::core::config::UpstreamConfig;
use crate::core::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct GeminiAdapter {
    http_client: reqwest::Client,
    upstream: UpstreamConfig,
}

impl GeminiAdapter {
    pub fn new(http_client: reqwest::Client, upstream: UpstreamConfig) -> Self {
        Self {
            http_client,
            upstream,
        }
    }

    /// Endpoint without the key; the key is attached as a query parameter.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.upstream.api_base, self.upstream.model
        )
    }

    pub fn build_payload(&self, message: &str) -> Value {
        json!({
            "contents": [
                { "parts": [ { "text": message } ] }
            ],
            "generationConfig": {
                "maxOutputTokens": MAX_TOKENS,
                "temperature": TEMPERATURE,
            }
        })
    }
}

/// `candidates[0].content.parts[0].text`, or the fallback text.
pub fn extract_text(response: &Value) -> String {
    text_or_fallback(
        response
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str),
    )
}

#[async_trait]
impl Adapter for GeminiAdapter {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn complete(
        &self,
        message: &str,
        api_key: &str,
        history: &[ChatMessage],
    ) -> Result<Completion> {
        let url = self.endpoint();
        tracing::debug!(
            provider = "Gemini",
            model = %self.upstream.model,
            dropped_history = history.len(),
            "Sending generate-content request"
        );

        let payload = self.build_payload(message);
        let request = build_upstream_request(
            &self.http_client,
            &url,
            &payload,
            UpstreamAuth::QueryKey(api_key),
        );
        let response = send_json(Provider::Gemini, request).await?;

        Ok(Completion::Text(extract_text(&response)))
    }
}
