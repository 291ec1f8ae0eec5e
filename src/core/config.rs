//! Configuration management for the chat gateway.
//!
//! All settings come from environment variables (a `.env` file is loaded by
//! the binary before this module reads anything). The caller's provider API
//! key is never part of configuration; it arrives with every request.

pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_PERPLEXITY_API_BASE: &str = "https://api.perplexity.ai";
pub const DEFAULT_PERPLEXITY_MODEL: &str = "sonar-pro";

/// Favicon lookup template; `{hostname}` is replaced per citation.
pub const DEFAULT_FAVICON_SERVICE: &str =
    "https://www.google.com/s2/favicons?domain={hostname}&sz=64";

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server configuration (host, port)
    pub server: ServerConfig,

    /// Whether to verify SSL certificates for upstream requests
    pub verify_ssl: bool,

    /// Request timeout in seconds for upstream providers
    pub request_timeout_secs: u64,

    /// Upstream endpoints, one per supported provider
    pub upstreams: UpstreamsConfig,

    /// Citation enrichment settings
    pub enrichment: EnrichmentConfig,
}

/// Server-specific configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Where a single provider lives and which model it is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Base URL without a trailing slash
    pub api_base: String,

    /// Fixed model name sent with every request
    pub model: String,
}

impl UpstreamConfig {
    pub fn new(api_base: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamsConfig {
    pub openai: UpstreamConfig,
    pub gemini: UpstreamConfig,
    pub perplexity: UpstreamConfig,
}

impl Default for UpstreamsConfig {
    fn default() -> Self {
        Self {
            openai: UpstreamConfig::new(DEFAULT_OPENAI_API_BASE, DEFAULT_OPENAI_MODEL),
            gemini: UpstreamConfig::new(DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL),
            perplexity: UpstreamConfig::new(DEFAULT_PERPLEXITY_API_BASE, DEFAULT_PERPLEXITY_MODEL),
        }
    }
}

/// Citation enrichment settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentConfig {
    /// Favicon URL template used by the local enricher
    pub favicon_service: String,

    /// Remote site-metadata service; when set it replaces the local enricher
    pub remote_url: Option<String>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            favicon_service: DEFAULT_FAVICON_SERVICE.to_string(),
            remote_url: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            verify_ssl: default_verify_ssl(),
            request_timeout_secs: default_request_timeout(),
            upstreams: UpstreamsConfig::default(),
            enrichment: EnrichmentConfig::default(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_verify_ssl() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    300
}

impl AppConfig {
    /// Build configuration from process environment variables.
    ///
    /// Unset variables keep their defaults; numeric values that fail to parse
    /// are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(host) = lookup("HOST") {
            config.server.host = host;
        }

        if let Some(port_str) = lookup("PORT") {
            match port_str.parse::<u16>() {
                Ok(port) => config.server.port = port,
                Err(_) => tracing::warn!(value = %port_str, "Ignoring invalid PORT"),
            }
        }

        if let Some(verify_ssl_str) = lookup("VERIFY_SSL") {
            config.verify_ssl = str_to_bool(&verify_ssl_str);
        }

        if let Some(timeout_str) = lookup("REQUEST_TIMEOUT_SECS") {
            match timeout_str.parse::<u64>() {
                Ok(timeout) => config.request_timeout_secs = timeout,
                Err(_) => {
                    tracing::warn!(value = %timeout_str, "Ignoring invalid REQUEST_TIMEOUT_SECS")
                }
            }
        }

        apply_upstream(&lookup, "OPENAI", &mut config.upstreams.openai);
        apply_upstream(&lookup, "GEMINI", &mut config.upstreams.gemini);
        apply_upstream(&lookup, "PERPLEXITY", &mut config.upstreams.perplexity);

        if let Some(template) = lookup("FAVICON_SERVICE") {
            config.enrichment.favicon_service = template;
        }
        config.enrichment.remote_url = lookup("ENRICHMENT_URL").filter(|u| !u.trim().is_empty());

        config
    }
}

fn apply_upstream<F>(lookup: &F, prefix: &str, upstream: &mut UpstreamConfig)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base) = lookup(&format!("{}_API_BASE", prefix)) {
        upstream.api_base = base.trim_end_matches('/').to_string();
    }
    if let Some(model) = lookup(&format!("{}_MODEL", prefix)) {
        upstream.model = model;
    }
}

/// Convert string to boolean.
///
/// Accepts: "true", "1", "yes", "on" (case-insensitive)
fn str_to_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
