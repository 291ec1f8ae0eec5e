//! Citation enrichment.
//!
//! Maps citation URLs to site metadata (hostname and favicon image URL).
//! Output always has the same length and order as the input.

use crate::adapters::Icon;
use crate::core::config::EnrichmentConfig;
use crate::core::logging::get_provider_context;
use crate::core::{AppError, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::json;
use std::sync::Arc;

#[async_trait]
pub trait CitationEnricher: Send + Sync {
    /// One [`Icon`] per URL, in input order. An empty input yields an empty
    /// output.
    async fn enrich(&self, urls: &[String]) -> Result<Vec<Icon>>;
}

/// Pick the enricher described by configuration.
pub fn build_enricher(
    config: &EnrichmentConfig,
    http_client: reqwest::Client,
) -> Arc<dyn CitationEnricher> {
    match &config.remote_url {
        Some(endpoint) => {
            tracing::info!(endpoint = %endpoint, "Using remote citation enrichment");
            Arc::new(RemoteEnricher::new(http_client, endpoint.clone()))
        }
        None => Arc::new(FaviconEnricher::new(config.favicon_service.clone())),
    }
}

/// Derives metadata locally from the URL and a favicon lookup template.
#[derive(Debug, Clone)]
pub struct FaviconEnricher {
    template: String,
}

impl FaviconEnricher {
    /// `template` must contain `{hostname}`.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Unparseable or host-less URLs get an empty hostname and favicon.
    pub fn icon_for(&self, url: &str) -> Icon {
        let hostname = Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_string))
            .unwrap_or_default();

        let favicon = if hostname.is_empty() {
            String::new()
        } else {
            self.template.replace("{hostname}", &hostname)
        };

        Icon {
            hostname,
            url: url.to_string(),
            favicon,
        }
    }
}

impl Default for FaviconEnricher {
    fn default() -> Self {
        Self::new(crate::core::config::DEFAULT_FAVICON_SERVICE)
    }
}

#[async_trait]
impl CitationEnricher for FaviconEnricher {
    async fn enrich(&self, urls: &[String]) -> Result<Vec<Icon>> {
        Ok(urls.iter().map(|url| self.icon_for(url)).collect())
    }
}

/// Asks an external site-metadata service.
///
/// Request: `POST {endpoint}` with `{"urls": [...]}`.
/// Response: JSON array of `{hostname, url, favicon}`.
pub struct RemoteEnricher {
    http_client: reqwest::Client,
    endpoint: String,
}

impl RemoteEnricher {
    pub fn new(http_client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl CitationEnricher for RemoteEnricher {
    async fn enrich(&self, urls: &[String]) -> Result<Vec<Icon>> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&json!({ "urls": urls }))
            .send()
            .await
            .map_err(|e| AppError::Enrichment(e.without_url().to_string()))?;

        let status = response.status();
        tracing::debug!(
            provider = %get_provider_context(),
            citations = urls.len(),
            status = %status,
            "Metadata service responded"
        );
        if !status.is_success() {
            return Err(AppError::Enrichment(format!(
                "metadata service returned {}",
                status
            )));
        }

        let icons: Vec<Icon> = response
            .json()
            .await
            .map_err(|e| AppError::Enrichment(e.without_url().to_string()))?;

        if icons.len() != urls.len() {
            return Err(AppError::Enrichment(format!(
                "expected {} icons, got {}",
                urls.len(),
                icons.len()
            )));
        }

        Ok(icons)
    }
}
