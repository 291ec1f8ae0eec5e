//! OpenAI chat-completions adapter.

use super::upstream::{build_upstream_request, send_json, UpstreamAuth};
use super::{conversation, text_or_fallback, Adapter, ChatMessage, Completion, Provider};
use super::{MAX_TOKENS, TEMPERATURE};
use crate::core::config::UpstreamConfig;
use crate::core::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct OpenAIAdapter {
    http_client: reqwest::Client,
    upstream: UpstreamConfig,
}

impl OpenAIAdapter {
    pub fn new(http_client: reqwest::Client, upstream: UpstreamConfig) -> Self {
        Self {
            http_client,
            upstream,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.upstream.api_base)
    }

    pub fn build_payload(&self, message: &str, history: &[ChatMessage]) -> Value {
        json!({
            "model": self.upstream.model,
            "messages": conversation(message, history),
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        })
    }
}

/// `choices[0].message.content`, or the fallback text.
pub fn extract_content(response: &Value) -> String {
    text_or_fallback(
        response
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str),
    )
}

#[async_trait]
impl Adapter for OpenAIAdapter {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn complete(
        &self,
        message: &str,
        api_key: &str,
        history: &[ChatMessage],
    ) -> Result<Completion> {
        let url = self.endpoint();
        tracing::debug!(
            provider = "OpenAI",
            model = %self.upstream.model,
            history_len = history.len(),
            "Sending chat completion request"
        );

        let payload = self.build_payload(message, history);
        let request =
            build_upstream_request(&self.http_client, &url, &payload, UpstreamAuth::Bearer(api_key));
        let response = send_json(Provider::OpenAI, request).await?;

        Ok(Completion::Text(extract_content(&response)))
    }
}
