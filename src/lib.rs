//! Chat Gateway - one endpoint, several LLM providers
//!
//! Accepts a single chat request, forwards it to exactly one of the
//! supported upstream APIs (OpenAI, Gemini, Perplexity) using the API key
//! supplied by the caller, and returns a uniform envelope:
//!
//! ```text
//! POST /api/chat {message, provider, apiKey, messages?}
//!   -> 200 {response, provider, timestamp}
//!   -> 400 {error}   missing fields / unsupported provider
//!   -> 500 {error}   upstream or internal failure
//! ```
//!
//! # Architecture
//!
//! - [`core`]: config, errors, logging context, metrics, middleware
//! - [`adapters`]: one [`adapters::Adapter`] per provider
//! - [`services`]: dispatch and citation enrichment
//! - [`api`]: HTTP handlers, models and OpenAPI docs
//! - [`server`]: router and HTTP client construction
//!
//! # Configuration
//!
//! All settings are optional environment variables:
//! - `HOST` / `PORT`: bind address (default: 0.0.0.0:3000)
//! - `VERIFY_SSL`: verify upstream certificates (default: true)
//! - `REQUEST_TIMEOUT_SECS`: upstream HTTP client timeout (default: 300)
//! - `{OPENAI,GEMINI,PERPLEXITY}_API_BASE` / `_MODEL`: upstream overrides
//! - `FAVICON_SERVICE`, `ENRICHMENT_URL`: citation enrichment

pub mod adapters;
pub mod api;
pub mod core;
pub mod server;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::{Adapter, AdapterSet, ChatMessage, Completion, Icon, Provider, Role};
pub use api::{AppState, ChatRequest, ChatResponseEnvelope};
pub use core::{AppConfig, AppError, Result};
pub use server::{build_router, create_http_client};
pub use services::{ChatService, CitationEnricher};
