//! Provider adapters.
//!
//! Each supported upstream LLM API is wrapped by one [`Adapter`]
//! implementation that shapes the outbound request and normalizes the
//! response into a [`Completion`].
//!
//! ```text
//! ChatRequest ─► Provider ─► AdapterSet::get ─► Adapter::complete ─► Completion
//! ```
//!
//! The set of providers is closed: [`AdapterSet`] holds one adapter per
//! [`Provider`] variant and selects through an exhaustive `match`, so adding
//! a provider fails to compile until it has an adapter.

pub mod gemini;
pub mod openai;
pub mod perplexity;
pub mod types;
pub mod upstream;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use utoipa::ToSchema;

pub use gemini::GeminiAdapter;
pub use openai::OpenAIAdapter;
pub use perplexity::PerplexityAdapter;
pub use types::{ChatMessage, Completion, Icon, Role};

use crate::core::config::UpstreamsConfig;
use crate::core::{AppError, Result};
use crate::services::citation::CitationEnricher;

/// Maximum tokens requested from every provider.
pub const MAX_TOKENS: u32 = 1000;

/// Sampling temperature sent to every provider.
pub const TEMPERATURE: f64 = 0.7;

/// Substituted when a provider answers without any content. Not an error.
pub const NO_RESPONSE_FALLBACK: &str = "No response received";

/// Supported upstream LLM vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Provider {
    OpenAI,
    Gemini,
    Perplexity,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::OpenAI, Provider::Gemini, Provider::Perplexity];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Gemini => "Gemini",
            Provider::Perplexity => "Perplexity",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = AppError;

    /// Exact, case-sensitive match on the wire name.
    fn from_str(s: &str) -> Result<Self> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or(AppError::UnsupportedProvider)
    }
}

/// One upstream chat-completion integration.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// The provider this adapter talks to.
    fn provider(&self) -> Provider;

    /// Send `message` (after `history`, where the provider supports it) and
    /// return the normalized result.
    async fn complete(
        &self,
        message: &str,
        api_key: &str,
        history: &[ChatMessage],
    ) -> Result<Completion>;
}

/// History followed by the new user turn, in chronological order.
pub(crate) fn conversation(message: &str, history: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.extend_from_slice(history);
    messages.push(ChatMessage::user(message));
    messages
}

/// Non-empty string, or the fallback text.
pub(crate) fn text_or_fallback(text: Option<&str>) -> String {
    match text {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => NO_RESPONSE_FALLBACK.to_string(),
    }
}

/// One adapter per provider.
#[derive(Clone)]
pub struct AdapterSet {
    openai: Arc<dyn Adapter>,
    gemini: Arc<dyn Adapter>,
    perplexity: Arc<dyn Adapter>,
}

impl AdapterSet {
    /// Build the production adapters sharing one HTTP client.
    pub fn new(
        upstreams: &UpstreamsConfig,
        http_client: reqwest::Client,
        enricher: Arc<dyn CitationEnricher>,
    ) -> Self {
        Self {
            openai: Arc::new(OpenAIAdapter::new(
                http_client.clone(),
                upstreams.openai.clone(),
            )),
            gemini: Arc::new(GeminiAdapter::new(
                http_client.clone(),
                upstreams.gemini.clone(),
            )),
            perplexity: Arc::new(PerplexityAdapter::new(
                http_client,
                upstreams.perplexity.clone(),
                enricher,
            )),
        }
    }

    /// Assemble a set from arbitrary adapters.
    pub fn from_parts(
        openai: Arc<dyn Adapter>,
        gemini: Arc<dyn Adapter>,
        perplexity: Arc<dyn Adapter>,
    ) -> Self {
        Self {
            openai,
            gemini,
            perplexity,
        }
    }

    pub fn get(&self, provider: Provider) -> &Arc<dyn Adapter> {
        match provider {
            Provider::OpenAI => &self.openai,
            Provider::Gemini => &self.gemini,
            Provider::Perplexity => &self.perplexity,
        }
    }
}
