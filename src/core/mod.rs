//! Core functionality for the chat gateway.
//!
//! This module contains fundamental components used throughout the application:
//! - Configuration management
//! - Error handling
//! - Logging context
//! - Metrics collection
//! - HTTP middleware

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod middleware;

// Re-export commonly used types
pub use config::{AppConfig, EnrichmentConfig, ServerConfig, UpstreamConfig, UpstreamsConfig};
pub use error::{AppError, Result};
pub use logging::{get_provider_context, get_request_id, init_tracing, PROVIDER_CONTEXT, REQUEST_ID};
pub use metrics::{get_metrics, init_metrics, Metrics};
pub use middleware::{request_id_middleware, MetricsMiddleware, ProviderName};
