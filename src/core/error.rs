//! Error types and handling for the chat gateway.
//!
//! This module provides a unified error type [`AppError`] covering request
//! validation, upstream provider failures and internal faults, and its
//! conversion into the `{"error": "..."}` HTTP body.

use crate::adapters::Provider;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::error::Error as _;
use thiserror::Error;

/// Message used when a failure carries no text of its own.
pub const GENERIC_ERROR_MESSAGE: &str = "Internal server error";

/// Main error type for the application.
///
/// Validation variants map to 400, everything else to 500.
#[derive(Error, Debug)]
pub enum AppError {
    /// One of `message`, `provider` or `apiKey` is absent or empty
    #[error("Missing required fields: message, provider, or apiKey")]
    MissingFields,

    /// Provider name outside the supported set
    #[error("Unsupported provider")]
    UnsupportedProvider,

    /// Client sent a body that could not be read as a chat request
    #[error("{0}")]
    BadRequest(String),

    /// Upstream returned a non-success HTTP status
    #[error("{provider} API error: {status} {status_text}")]
    Upstream {
        provider: Provider,
        status: u16,
        status_text: String,
    },

    /// Transport or body decoding failure from the reqwest client.
    ///
    /// Always constructed through `From`, which strips the request URL so a
    /// key carried in the query string cannot surface in a message.
    #[error("{}", describe_request_error(.0))]
    Request(reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Citation enrichment collaborator failed
    #[error("Citation enrichment failed: {0}")]
    Enrichment(String),

    /// Generic internal server errors with custom message
    #[error("{0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::Request(error.without_url())
    }
}

fn describe_request_error(error: &reqwest::Error) -> String {
    match error.source() {
        Some(source) => format!("{}: {}", error, source),
        None => error.to_string(),
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingFields | AppError::UnsupportedProvider | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the `error` field of the response body.
    pub fn public_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.public_message();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "Chat request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %message, "Chat request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Convenience type alias for Results using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
