use serde::{Deserialize, Serialize};
use serde_json::Value;

// Stored result of one generation, keyed by business identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub key: String,
    pub response: Value,
    #[serde(default)]
    pub prompt_text: String,
    #[serde(default)]
    pub auxiliary_tag: String,
    #[serde(default)]
    pub created_at: i64,
}

// One cache-or-generate call, discarded once answered
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub key: String,
    pub prompt_text: String,
    pub auxiliary_tag: String,
    pub cache_only: bool,
}

// Stateless passthrough call, never stored
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message_text: String,
    pub model_identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub model: String,
}

// Result of a cache-or-generate call
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub entry: CacheEntry,
    pub cache_hit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySummary {
    pub key: String,
    pub created_at: i64,
}

// Query string of GET/DELETE /gpt; every field optional so parsing never fails on shape
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GptQuery {
    #[serde(alias = "keyword")]
    pub key: Option<String>,
    #[serde(alias = "gptInput")]
    pub prompt_text: Option<String>,
    #[serde(alias = "promo")]
    pub auxiliary_tag: Option<String>,
    pub cache_only: Option<String>,
    pub mode: Option<String>,
    pub purge: Option<String>,
    pub auth_token: Option<String>,
}

// Body of POST /gpt
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GptBody {
    pub mode: Option<String>,
    #[serde(alias = "keyword")]
    pub key: Option<String>,
    #[serde(alias = "gptInput")]
    pub prompt_text: Option<String>,
    #[serde(alias = "promo")]
    pub auxiliary_tag: Option<String>,
    #[serde(alias = "message")]
    pub message_text: Option<String>,
    #[serde(alias = "model")]
    pub model_identifier: Option<String>,
}

// Query string of the record endpoints
#[derive(Debug, Default, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

/// Interprets a loosely-typed query flag. `true`, `1` and `yes` are truthy.
pub fn is_truthy(flag: Option<&str>) -> bool {
    matches!(
        flag.map(|f| f.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "1" | "yes")
    )
}
