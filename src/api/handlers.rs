//! HTTP request handlers for the chat gateway.

use crate::adapters::{AdapterSet, Provider};
use crate::api::models::{ChatRequest, ChatResponseEnvelope, ErrorResponse, HealthResponse};
use crate::core::config::AppConfig;
use crate::core::logging::get_request_id;
use crate::core::middleware::ProviderName;
use crate::core::{AppError, Result};
use crate::services::{build_enricher, ChatService};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub chat_service: ChatService,
}

impl AppState {
    /// Wire the production adapters and enricher around one HTTP client.
    pub fn new(config: AppConfig, http_client: reqwest::Client) -> Self {
        let enricher = build_enricher(&config.enrichment, http_client.clone());
        let adapters = AdapterSet::new(&config.upstreams, http_client, enricher);
        Self::with_service(config, ChatService::new(adapters))
    }

    pub fn with_service(config: AppConfig, chat_service: ChatService) -> Self {
        Self {
            config,
            chat_service,
        }
    }
}

/// Handle a chat request.
///
/// The body is read as raw bytes regardless of content type, so missing
/// fields are reported the same way whether or not the client sent
/// `application/json`.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Provider answered", body = ChatResponseEnvelope),
        (status = 400, description = "Missing fields, unsupported provider or unreadable body", body = ErrorResponse),
        (status = 500, description = "Upstream or internal failure", body = ErrorResponse),
    ),
    tag = "chat"
)]
#[tracing::instrument(
    skip(state, body),
    fields(request_id = %get_request_id())
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Response {
    let request = match ChatRequest::from_body(&body) {
        Ok(request) => request,
        Err(error) => return error.into_response(),
    };

    let provider = request
        .provider
        .as_deref()
        .and_then(|p| p.parse::<Provider>().ok());

    let mut response = match state.chat_service.dispatch(&request).await {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(error) => error.into_response(),
    };

    if let Some(provider) = provider {
        response
            .extensions_mut()
            .insert(ProviderName(provider.to_string()));
    }
    response
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "health"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Prometheus metrics endpoint
pub async fn metrics_handler() -> Result<Response> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [("Content-Type", encoder.format_type().to_string())],
        buffer,
    )
        .into_response())
}
