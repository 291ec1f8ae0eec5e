//! OpenAPI documentation for the public endpoints.

use utoipa::OpenApi;

use crate::adapters::{ChatMessage, Icon, Provider, Role};
use crate::api::models::{ChatRequest, ChatResponseEnvelope, ErrorResponse, HealthResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chat Gateway API",
        description = "Single entry point dispatching chat requests to OpenAI, Gemini or Perplexity."
    ),
    paths(crate::api::handlers::chat, crate::api::handlers::health),
    components(schemas(
        ChatRequest,
        ChatMessage,
        Role,
        Provider,
        Icon,
        ChatResponseEnvelope,
        ErrorResponse,
        HealthResponse
    )),
    tags(
        (name = "chat", description = "Multi-provider chat completion"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;
