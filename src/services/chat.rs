//! Chat dispatch.
//!
//! Validates an inbound [`ChatRequest`], hands it to the adapter for the
//! requested provider and wraps the result in a [`ChatResponseEnvelope`].
//! Any adapter failure propagates unchanged; turning it into an HTTP body is
//! left to [`AppError`](crate::core::AppError)'s response conversion.

use crate::adapters::{AdapterSet, ChatMessage, Provider};
use crate::api::models::{ChatRequest, ChatResponseEnvelope};
use crate::core::logging::PROVIDER_CONTEXT;
use crate::core::{AppError, Result};
use std::time::Instant;

/// A request that passed validation, borrowing from the inbound body.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedRequest<'a> {
    pub provider: Provider,
    pub message: &'a str,
    pub api_key: &'a str,
    pub history: &'a [ChatMessage],
}

/// Check required fields, then resolve the provider.
///
/// Missing fields are reported before an unknown provider.
pub fn validate_request(request: &ChatRequest) -> Result<ValidatedRequest<'_>> {
    let (Some(message), Some(provider), Some(api_key)) = (
        non_empty(&request.message),
        non_empty(&request.provider),
        non_empty(&request.api_key),
    ) else {
        return Err(AppError::MissingFields);
    };

    Ok(ValidatedRequest {
        provider: provider.parse()?,
        message,
        api_key,
        history: request.messages.as_deref().unwrap_or_default(),
    })
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

#[derive(Clone)]
pub struct ChatService {
    adapters: AdapterSet,
}

impl ChatService {
    pub fn new(adapters: AdapterSet) -> Self {
        Self { adapters }
    }

    pub async fn dispatch(&self, request: &ChatRequest) -> Result<ChatResponseEnvelope> {
        let validated = validate_request(request)?;
        let provider = validated.provider;
        let adapter = self.adapters.get(provider);
        let start = Instant::now();

        let completion = PROVIDER_CONTEXT
            .scope(
                provider.to_string(),
                adapter.complete(validated.message, validated.api_key, validated.history),
            )
            .await?;

        tracing::info!(
            provider = %provider,
            history_len = validated.history.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Chat completion succeeded"
        );

        Ok(ChatResponseEnvelope::new(completion, provider))
    }
}
