//! Upstream request execution shared by the provider adapters.
//!
//! Builds authenticated provider requests, sends them, converts non-success
//! statuses into [`AppError::Upstream`] and records upstream metrics.

use super::Provider;
use crate::core::metrics::get_metrics;
use crate::core::{AppError, Result};
use serde_json::Value;
use std::time::Instant;

/// Authentication mode for an upstream provider request.
#[derive(Clone, Copy)]
pub enum UpstreamAuth<'a> {
    /// `Authorization: Bearer <key>` header
    Bearer(&'a str),
    /// `?key=<key>` query parameter
    QueryKey(&'a str),
}

/// Build a JSON POST request with the given authentication.
pub fn build_upstream_request(
    http_client: &reqwest::Client,
    url: &str,
    payload: &Value,
    auth: UpstreamAuth<'_>,
) -> reqwest::RequestBuilder {
    let request = http_client.post(url);

    let request = match auth {
        UpstreamAuth::Bearer(api_key) => {
            request.header("Authorization", format!("Bearer {}", api_key))
        }
        UpstreamAuth::QueryKey(api_key) => request.query(&[("key", api_key)]),
    };

    request.json(payload)
}

/// Send an upstream request and decode its JSON body.
///
/// Non-success statuses become [`AppError::Upstream`] carrying the status
/// code and its canonical reason phrase; the error body is only logged.
pub async fn send_json(provider: Provider, request: reqwest::RequestBuilder) -> Result<Value> {
    let metrics = get_metrics();
    let provider_label = provider.as_str();
    let start = Instant::now();

    let response = request.send().await.map_err(|e| {
        metrics
            .upstream_errors
            .with_label_values(&[provider_label, "transport"])
            .inc();
        tracing::error!(
            provider = %provider,
            is_timeout = e.is_timeout(),
            is_connect = e.is_connect(),
            "HTTP request failed to provider"
        );
        AppError::from(e)
    })?;

    metrics
        .upstream_latency
        .with_label_values(&[provider_label])
        .observe(start.elapsed().as_secs_f64());

    let status = response.status();
    tracing::debug!(provider = %provider, status = %status, "Upstream request completed");

    if !status.is_success() {
        metrics
            .upstream_errors
            .with_label_values(&[provider_label, "status"])
            .inc();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            provider = %provider,
            status = status.as_u16(),
            body = %truncate_for_log(&body),
            "Upstream returned error status"
        );
        return Err(AppError::Upstream {
            provider,
            status: status.as_u16(),
            status_text: status
                .canonical_reason()
                .unwrap_or("Unknown Status")
                .to_string(),
        });
    }

    response.json::<Value>().await.map_err(|e| {
        metrics
            .upstream_errors
            .with_label_values(&[provider_label, "decode"])
            .inc();
        AppError::from(e)
    })
}

const MAX_LOGGED_BODY_LEN: usize = 500;

fn truncate_for_log(body: &str) -> &str {
    match body.char_indices().nth(MAX_LOGGED_BODY_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
