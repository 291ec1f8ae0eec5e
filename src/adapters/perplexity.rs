//! Perplexity chat-completions adapter.
//!
//! Unlike the other adapters the answer is not reduced to text: the full
//! upstream object is returned together with site metadata for each of its
//! citations.

use super::upstream::{build_upstream_request, send_json, UpstreamAuth};
use super::{conversation, Adapter, ChatMessage, Completion, Provider};
use super::{MAX_TOKENS, TEMPERATURE};
use crate::core::config::UpstreamConfig;
use crate::core::{AppError, Result};
use crate::services::citation::CitationEnricher;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct PerplexityAdapter {
    http_client: reqwest::Client,
    upstream: UpstreamConfig,
    enricher: Arc<dyn CitationEnricher>,
}

impl PerplexityAdapter {
    pub fn new(
        http_client: reqwest::Client,
        upstream: UpstreamConfig,
        enricher: Arc<dyn CitationEnricher>,
    ) -> Self {
        Self {
            http_client,
            upstream,
            enricher,
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

/// One entry per element of the payload's `citations` array, in order.
///
/// Non-string elements become an empty string so that the icon list stays
/// aligned with `citations`; they enrich to an icon with an empty hostname
/// and favicon.
pub fn extract_citations(payload: &Value) -> Vec<String> {
    payload
        .get("citations")
        .and_then(Value::as_array)
        .map(|citations| {
            citations
                .iter()
                .map(|citation| citation.as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl Adapter for PerplexityAdapter {
    fn provider(&self) -> Provider {
        Provider::Perplexity
    }

    async fn complete(
        &self,
        message: &str,
        api_key: &str,
        history: &[ChatMessage],
    ) -> Result<Completion> {
        let url = self.endpoint();
        tracing::debug!(
            provider = "Perplexity",
            model = %self.upstream.model,
            history_len = history.len(),
            "Sending chat completion request"
        );

        let payload = self.build_payload(message, history);
        let request =
            build_upstream_request(&self.http_client, &url, &payload, UpstreamAuth::Bearer(api_key));
        let response = send_json(Provider::Perplexity, request).await?;

        let citations = extract_citations(&response);
        let payload = match response {
            Value::Object(map) => map,
            other => {
                return Err(AppError::Internal(format!(
                    "Perplexity API returned a non-object response: {}",
                    json_type_name(&other)
                )))
            }
        };

        let icons = self.enricher.enrich(&citations).await?;
        tracing::debug!(citations = citations.len(), "Citations enriched");

        Ok(Completion::Cited { payload, icons })
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
