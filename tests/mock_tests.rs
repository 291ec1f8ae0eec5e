//! Mock-based tests for upstream provider interactions.
//!
//! These tests use wiremock to stand in for the OpenAI, Gemini and
//! Perplexity APIs and drive the full router with `oneshot`.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chat_gateway::{
    build_router,
    core::{
        config::{UpstreamConfig, UpstreamsConfig},
        init_metrics, AppConfig,
    },
    AdapterSet, AppState, ChatService, CitationEnricher, Icon, Result,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::{
    matchers::{body_json, body_partial_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

/// Deterministic enricher so icon assertions do not depend on URL parsing.
struct StubEnricher;

#[async_trait]
impl CitationEnricher for StubEnricher {
    async fn enrich(&self, urls: &[String]) -> Result<Vec<Icon>> {
        Ok(urls
            .iter()
            .enumerate()
            .map(|(i, url)| Icon {
                hostname: format!("host-{}", i),
                url: url.clone(),
                favicon: format!("stub://{}", url),
            })
            .collect())
    }
}

fn mock_config(mock_server: &MockServer) -> AppConfig {
    let base = mock_server.uri();
    AppConfig {
        upstreams: UpstreamsConfig {
            openai: UpstreamConfig::new(format!("{}/openai/v1", base), "gpt-3.5-turbo"),
            gemini: UpstreamConfig::new(format!("{}/gemini/v1beta", base), "gemini-pro"),
            perplexity: UpstreamConfig::new(format!("{}/perplexity", base), "sonar-pro"),
        },
        verify_ssl: false,
        ..AppConfig::default()
    }
}

/// Create a test app whose adapters point at the mock server.
fn create_test_app_with_mock(mock_server: &MockServer) -> Router {
    init_metrics();

    let config = mock_config(mock_server);
    let http_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("Failed to build HTTP client");

    let adapters = AdapterSet::new(&config.upstreams, http_client, Arc::new(StubEnricher));
    let state = Arc::new(AppState::with_service(config, ChatService::new(adapters)));
    build_router(state)
}

fn chat_request(body: Value) -> Request<Body> {
    Request::builder()
        .uri("/api/chat")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, body: Value) -> (StatusCode, Value) {
    let response = app.oneshot(chat_request(body)).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn openai_completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "gpt-3.5-turbo",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_openai_success_forwards_history() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hey"},
                {"role": "user", "content": "say hello"}
            ],
            "max_tokens": 1000,
            "temperature": 0.7
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion("hello")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app_with_mock(&mock_server);
    let (status, body) = send(
        app,
        json!({
            "message": "say hello",
            "provider": "OpenAI",
            "apiKey": "sk-test",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hey"}
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "hello");
    assert_eq!(body["provider"], "OpenAI");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_openai_without_choices_uses_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&mock_server)
        .await;

    let app = create_test_app_with_mock(&mock_server);
    let (status, body) = send(
        app,
        json!({"message": "hi", "provider": "OpenAI", "apiKey": "sk-test"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "No response received");
}

#[tokio::test]
async fn test_gemini_sends_only_new_message_with_query_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/gemini/v1beta/models/gemini-pro:generateContent"))
        .and(query_param("key", "g-key"))
        .and(body_json(json!({
            "contents": [{"parts": [{"text": "new question"}]}],
            "generationConfig": {"maxOutputTokens": 1000, "temperature": 0.7}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "hi"}], "role": "model"}}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app_with_mock(&mock_server);
    let (status, body) = send(
        app,
        json!({
            "message": "new question",
            "provider": "Gemini",
            "apiKey": "g-key",
            "messages": [
                {"role": "user", "content": "old question"},
                {"role": "assistant", "content": "old answer"}
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "hi");
    assert_eq!(body["provider"], "Gemini");

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("authorization").is_none());
    let sent: Value = received[0].body_json().unwrap();
    assert!(!sent.to_string().contains("old question"));
}

#[tokio::test]
async fn test_perplexity_returns_payload_with_icons_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/perplexity/chat/completions"))
        .and(header("authorization", "Bearer pplx-key"))
        .and(body_partial_json(json!({"model": "sonar-pro"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pplx-1",
            "model": "sonar-pro",
            "citations": ["https://second.example/b", "https://first.example/a"],
            "choices": [{"message": {"role": "assistant", "content": "answer [1][2]"}}]
        })))
        .mount(&mock_server)
        .await;

    let app = create_test_app_with_mock(&mock_server);
    let (status, body) = send(
        app,
        json!({"message": "q", "provider": "Perplexity", "apiKey": "pplx-key"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["provider"], "Perplexity");

    let response = &body["response"];
    assert_eq!(response["id"], "pplx-1");
    assert_eq!(response["choices"][0]["message"]["content"], "answer [1][2]");
    assert_eq!(
        response["icons"],
        json!([
            {"hostname": "host-0", "url": "https://second.example/b", "favicon": "stub://https://second.example/b"},
            {"hostname": "host-1", "url": "https://first.example/a", "favicon": "stub://https://first.example/a"}
        ])
    );
}

#[tokio::test]
async fn test_perplexity_without_citations_has_empty_icons() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/perplexity/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pplx-2",
            "choices": [{"message": {"role": "assistant", "content": "no sources"}}]
        })))
        .mount(&mock_server)
        .await;

    let app = create_test_app_with_mock(&mock_server);
    let (status, body) = send(
        app,
        json!({"message": "q", "provider": "Perplexity", "apiKey": "pplx-key"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["icons"], json!([]));
}

#[tokio::test]
async fn test_perplexity_with_default_favicon_enricher() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/perplexity/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "citations": ["https://www.rust-lang.org/learn"]
        })))
        .mount(&mock_server)
        .await;

    init_metrics();
    let config = mock_config(&mock_server);
    let client = chat_gateway::create_http_client(&config).unwrap();
    let app = build_router(Arc::new(AppState::new(config, client)));

    let (status, body) = send(
        app,
        json!({"message": "q", "provider": "Perplexity", "apiKey": "pplx-key"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let icon = &body["response"]["icons"][0];
    assert_eq!(icon["hostname"], "www.rust-lang.org");
    assert_eq!(icon["url"], "https://www.rust-lang.org/learn");
    assert_eq!(
        icon["favicon"],
        "https://www.google.com/s2/favicons?domain=www.rust-lang.org&sz=64"
    );
}

#[tokio::test]
async fn test_perplexity_icons_stay_aligned_with_non_string_citations() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/perplexity/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "citations": ["https://a.example/x", null, 7, "https://b.example/y"]
        })))
        .mount(&mock_server)
        .await;

    init_metrics();
    let config = mock_config(&mock_server);
    let client = chat_gateway::create_http_client(&config).unwrap();
    let app = build_router(Arc::new(AppState::new(config, client)));

    let (status, body) = send(
        app,
        json!({"message": "q", "provider": "Perplexity", "apiKey": "pplx-key"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let icons = body["response"]["icons"].as_array().unwrap();
    assert_eq!(icons.len(), 4);
    assert_eq!(icons[0]["hostname"], "a.example");
    assert_eq!(icons[1], json!({"hostname": "", "url": "", "favicon": ""}));
    assert_eq!(icons[2], json!({"hostname": "", "url": "", "favicon": ""}));
    assert_eq!(icons[3]["hostname"], "b.example");
}

#[tokio::test]
async fn test_enrichment_url_routes_citations_to_remote_service() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/perplexity/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "citations": ["https://a.example/x", "https://b.example/y"]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/site-meta"))
        .and(body_json(json!({"urls": ["https://a.example/x", "https://b.example/y"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"hostname": "a.example", "url": "https://a.example/x", "favicon": "https://meta.test/a.png"},
            {"hostname": "b.example", "url": "https://b.example/y", "favicon": "https://meta.test/b.png"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    init_metrics();
    let mut config = mock_config(&mock_server);
    config.enrichment.remote_url = Some(format!("{}/site-meta", mock_server.uri()));
    let client = chat_gateway::create_http_client(&config).unwrap();
    let app = build_router(Arc::new(AppState::new(config, client)));

    let (status, body) = send(
        app,
        json!({"message": "q", "provider": "Perplexity", "apiKey": "pplx-key"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["icons"][0]["favicon"], "https://meta.test/a.png");
    assert_eq!(body["response"]["icons"][1]["favicon"], "https://meta.test/b.png");
}

#[tokio::test]
async fn test_without_enrichment_url_no_remote_call_is_made() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/perplexity/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "citations": ["https://a.example/x"]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/site-meta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    init_metrics();
    let config = mock_config(&mock_server);
    let client = chat_gateway::create_http_client(&config).unwrap();
    let app = build_router(Arc::new(AppState::new(config, client)));

    let (status, body) = send(
        app,
        json!({"message": "q", "provider": "Perplexity", "apiKey": "pplx-key"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["response"]["icons"][0]["favicon"],
        "https://www.google.com/s2/favicons?domain=a.example&sz=64"
    );
}

#[tokio::test]
async fn test_upstream_401_becomes_500() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided"}
        })))
        .mount(&mock_server)
        .await;

    let app = create_test_app_with_mock(&mock_server);
    let (status, body) = send(
        app,
        json!({"message": "hi", "provider": "OpenAI", "apiKey": "sk-bad"}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "OpenAI API error: 401 Unauthorized"}));
}

#[tokio::test]
async fn test_gemini_error_does_not_leak_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/gemini/v1beta/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let app = create_test_app_with_mock(&mock_server);
    let (status, body) = send(
        app,
        json!({"message": "hi", "provider": "Gemini", "apiKey": "g-secret-key"}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("403"));
    assert!(!error.contains("g-secret-key"));
}

#[tokio::test]
async fn test_invalid_upstream_json_is_500() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let app = create_test_app_with_mock(&mock_server);
    let (status, body) = send(
        app,
        json!({"message": "hi", "provider": "OpenAI", "apiKey": "sk-test"}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_perplexity_non_object_payload_is_500() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/perplexity/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["unexpected"])))
        .mount(&mock_server)
        .await;

    let app = create_test_app_with_mock(&mock_server);
    let (status, body) = send(
        app,
        json!({"message": "q", "provider": "Perplexity", "apiKey": "pplx-key"}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("non-object"));
}

#[tokio::test]
async fn test_identical_requests_give_identical_responses() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/perplexity/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "same",
            "citations": ["https://a.example/"]
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let request = json!({"message": "q", "provider": "Perplexity", "apiKey": "pplx-key"});
    let (first_status, first) =
        send(create_test_app_with_mock(&mock_server), request.clone()).await;
    let (second_status, second) = send(create_test_app_with_mock(&mock_server), request).await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first["response"], second["response"]);
    assert_eq!(first["provider"], second["provider"]);
}

#[tokio::test]
async fn test_validation_errors_never_reach_upstream() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion("unused")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (status, body) = send(
        create_test_app_with_mock(&mock_server),
        json!({"message": "hi", "provider": "OpenAI"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "Missing required fields: message, provider, or apiKey"})
    );

    let (status, body) = send(
        create_test_app_with_mock(&mock_server),
        json!({"message": "hi", "provider": "Anthropic", "apiKey": "k"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Unsupported provider"}));
}
