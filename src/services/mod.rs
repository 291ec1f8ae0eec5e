//! Business logic for the chat gateway.
//!
//! - [`chat`]: request validation and provider dispatch
//! - [`citation`]: citation URL enrichment used by the Perplexity adapter

pub mod chat;
pub mod citation;

pub use chat::{validate_request, ChatService, ValidatedRequest};
pub use citation::{build_enricher, CitationEnricher, FaviconEnricher, RemoteEnricher};
