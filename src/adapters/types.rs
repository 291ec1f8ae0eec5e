//! Conversation and result types shared by every provider adapter.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Speaker of a single conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"role": "user", "content": "Hello!"}))]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Site metadata for one citation URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "hostname": "en.wikipedia.org",
    "url": "https://en.wikipedia.org/wiki/Rust_(programming_language)",
    "favicon": "https://www.google.com/s2/favicons?domain=en.wikipedia.org&sz=64"
}))]
pub struct Icon {
    pub hostname: String,
    pub url: String,
    pub favicon: String,
}

/// Normalized adapter result.
///
/// On the wire a [`Completion::Text`] is a bare JSON string, while a
/// [`Completion::Cited`] is the upstream object with an `icons` array added.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Text(String),
    Cited {
        payload: Map<String, Value>,
        icons: Vec<Icon>,
    },
}

impl Completion {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Completion::Text(text) => Some(text),
            Completion::Cited { .. } => None,
        }
    }

    pub fn icons(&self) -> &[Icon] {
        match self {
            Completion::Text(_) => &[],
            Completion::Cited { icons, .. } => icons,
        }
    }
}

impl Serialize for Completion {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Completion::Text(text) => serializer.serialize_str(text),
            Completion::Cited { payload, icons } => {
                let mut map = serializer.serialize_map(None)?;
                for (key, value) in payload.iter().filter(|(key, _)| *key != "icons") {
                    map.serialize_entry(key, value)?;
                }
                map.serialize_entry("icons", icons)?;
                map.end()
            }
        }
    }
}
