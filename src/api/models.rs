//! API request and response models.

use crate::adapters::{ChatMessage, Completion, Provider};
use crate::core::{AppError, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use utoipa::ToSchema;

/// Inbound chat request.
///
/// Every field is optional at the serde level so that absent values reach
/// validation and produce the documented error text instead of a parse
/// failure.
#[derive(Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "message": "What's new in Rust?",
    "provider": "Perplexity",
    "apiKey": "pplx-...",
    "messages": [
        {"role": "user", "content": "Hi"},
        {"role": "assistant", "content": "Hello! How can I help?"}
    ]
}))]
pub struct ChatRequest {
    /// The new user turn
    #[serde(default)]
    pub message: Option<String>,

    /// "OpenAI", "Gemini" or "Perplexity"
    #[serde(default)]
    pub provider: Option<String>,

    /// Provider API key; used for this call only
    #[serde(default)]
    pub api_key: Option<String>,

    /// Earlier conversation turns, oldest first
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
}

impl ChatRequest {
    /// Read a request from raw body bytes, whatever the content type.
    ///
    /// Only a body that is not JSON at all is rejected here. Required fields
    /// that are absent or not strings come back as `None` so validation can
    /// report them; `messages` is decoded only once all of them are present.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?;

        let text_field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);

        let mut request = ChatRequest {
            message: text_field("message"),
            provider: text_field("provider"),
            api_key: text_field("apiKey"),
            messages: None,
        };

        if ![&request.message, &request.provider, &request.api_key]
            .iter()
            .all(|field| field.as_deref().is_some_and(|v| !v.is_empty()))
        {
            return Ok(request);
        }

        // Unsupported provider is reported ahead of a malformed history
        if request
            .provider
            .as_deref()
            .map_or(true, |p| p.parse::<Provider>().is_err())
        {
            return Ok(request);
        }

        request.messages = match value.get("messages") {
            None | Some(Value::Null) => None,
            Some(history) => Some(Vec::<ChatMessage>::deserialize(history).map_err(|e| {
                AppError::BadRequest(format!("Invalid request body: messages: {}", e))
            })?),
        };

        Ok(request)
    }
}

impl fmt::Debug for ChatRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatRequest")
            .field("message", &self.message)
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("messages", &self.messages)
            .finish()
    }
}

/// Successful chat response.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "response": "Hello! How can I help you today?",
    "provider": "OpenAI",
    "timestamp": "2026-01-01T12:00:00.000Z"
}))]
pub struct ChatResponseEnvelope {
    /// Text for OpenAI and Gemini; the upstream object with `icons` for Perplexity
    #[schema(value_type = serde_json::Value)]
    pub response: Completion,

    pub provider: Provider,

    /// ISO-8601 UTC instant the envelope was created
    pub timestamp: String,
}

impl ChatResponseEnvelope {
    pub fn new(response: Completion, provider: Provider) -> Self {
        Self {
            response,
            provider,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Error body returned for every 4xx/5xx.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"error": "Missing required fields: message, provider, or apiKey"}))]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"status": "ok"}))]
pub struct HealthResponse {
    pub status: String,
}
