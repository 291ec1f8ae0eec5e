//! API layer for the chat gateway.
//!
//! This module contains the HTTP handlers, request/response models and
//! OpenAPI documentation for the public endpoints.

pub mod handlers;
pub mod models;
pub mod openapi;

// Re-export commonly used types
pub use handlers::{chat, health, metrics_handler, AppState};
pub use models::{ChatRequest, ChatResponseEnvelope, ErrorResponse, HealthResponse};
pub use openapi::ApiDoc;
