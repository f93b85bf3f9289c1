//! Cache-or-generate orchestration.
//!
//! A lookup is served straight from the store when the key is present. On a
//! miss the prompt goes to the [`TextGenerator`], the text is run through
//! [`normalize`] and the resulting entry is written with overwrite semantics.
//! Stored responses are never re-normalized on the way out.
//!
//! There is no single-flight deduplication: two concurrent misses for the same
//! key both generate, and the last write wins.

use std::sync::Arc;
use std::time::Instant;

use sha2::{Digest, Sha256};

use crate::error::GatewayError;
use crate::generation::TextGenerator;
use crate::metrics::{CACHE_HITS, CACHE_MISSES, GENERATION_LATENCY, UPSTREAM_FAILURES};
use crate::models::{
    CacheEntry, ChatReply, ChatRequest, EntrySummary, GenerationRequest, Resolved,
};
use crate::normalize::normalize;
use crate::store::KeyValueStore;

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub table: String,
    pub default_model: String,
    pub purge_secret: Option<String>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            table: "GPT_Transactions".to_string(),
            default_model: "gpt-3.5-turbo".to_string(),
            purge_secret: None,
        }
    }
}

#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn KeyValueStore>,
    generator: Arc<dyn TextGenerator>,
    settings: GatewaySettings,
}

/// Lowercases and trims a business identifier, rejecting it when nothing is left.
pub fn normalize_key(raw: &str) -> Result<String, GatewayError> {
    let key = raw.trim().to_lowercase();
    if key.is_empty() {
        return Err(GatewayError::validation("Missing required field: key"));
    }
    Ok(key)
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

impl Gateway {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        generator: Arc<dyn TextGenerator>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            store,
            generator,
            settings,
        }
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    pub async fn resolve(&self, request: GenerationRequest) -> Result<Resolved, GatewayError> {
        let key = normalize_key(&request.key)?;

        if let Some(entry) = self.lookup(&key).await? {
            CACHE_HITS.inc();
            tracing::debug!(key = %key, "cache hit");
            return Ok(Resolved {
                entry,
                cache_hit: true,
            });
        }

        CACHE_MISSES.inc();
        tracing::debug!(key = %key, cache_only = request.cache_only, "cache miss");

        if request.cache_only {
            return Err(GatewayError::not_found(format!(
                "No cached entry for key '{}'",
                key
            )));
        }

        let prompt = request.prompt_text.trim();
        if prompt.is_empty() {
            return Err(GatewayError::validation(
                "Missing required field: promptText",
            ));
        }

        let raw = self.generate(prompt, &self.settings.default_model).await?;

        let entry = CacheEntry {
            key: key.clone(),
            response: normalize(&raw),
            prompt_text: prompt.to_string(),
            auxiliary_tag: request.auxiliary_tag.trim().to_string(),
            created_at: now_unix(),
        };

        let document = serde_json::to_value(&entry)?;
        self.store.put(&self.settings.table, &key, &document).await?;
        tracing::info!(key = %key, "stored generated entry");

        Ok(Resolved {
            entry,
            cache_hit: false,
        })
    }

    pub async fn chat(&self, request: ChatRequest) -> Result<ChatReply, GatewayError> {
        let message = request.message_text.trim();
        if message.is_empty() {
            return Err(GatewayError::validation(
                "Missing required field: messageText",
            ));
        }

        let model = request
            .model_identifier
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.settings.default_model.as_str())
            .to_string();

        let reply = self.generate(message, &model).await?;
        Ok(ChatReply { reply, model })
    }

    /// Every stored key with its creation time, most recent first. Entries
    /// without a timestamp sort as zero; ties are ordered by key.
    pub async fn list_entries(&self) -> Result<Vec<EntrySummary>, GatewayError> {
        let rows = self.store.scan(&self.settings.table).await?;

        let mut entries: Vec<EntrySummary> = rows
            .into_iter()
            .map(|(store_key, document)| EntrySummary {
                key: document
                    .get("key")
                    .and_then(|k| k.as_str())
                    .map(str::to_string)
                    .unwrap_or(store_key),
                created_at: document
                    .get("createdAt")
                    .and_then(|t| t.as_i64())
                    .unwrap_or(0),
            })
            .collect();

        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.key.cmp(&b.key))
        });
        Ok(entries)
    }

    /// Deletes every entry after checking `auth_token` against the configured
    /// secret. Returns how many entries were removed.
    pub async fn purge_all(&self, auth_token: &str) -> Result<usize, GatewayError> {
        if !self.authorized(auth_token) {
            return Err(GatewayError::authorization("Invalid purge token"));
        }

        let rows = self.store.scan(&self.settings.table).await?;
        let mut deleted = 0;

        for (key, _) in rows {
            match self.store.delete(&self.settings.table, &key).await {
                Ok(true) => deleted += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(deleted, key = %key, "purge interrupted");
                    let message = match e {
                        GatewayError::Storage { message, .. } => message,
                        other => other.to_string(),
                    };
                    return Err(GatewayError::partial_storage(message, deleted));
                }
            }
        }

        tracing::info!(deleted, "purged generation cache");
        Ok(deleted)
    }

    async fn lookup(&self, key: &str) -> Result<Option<CacheEntry>, GatewayError> {
        let Some(document) = self.store.get(&self.settings.table, key).await? else {
            return Ok(None);
        };

        serde_json::from_value(document).map(Some).map_err(|e| {
            GatewayError::storage(format!("Corrupt cache entry '{}': {}", key, e))
        })
    }

    async fn generate(&self, prompt: &str, model: &str) -> Result<String, GatewayError> {
        tracing::info!(model, "calling generation provider");
        let start_time = Instant::now();

        let result = self.generator.generate(prompt, model).await;
        GENERATION_LATENCY.observe(start_time.elapsed().as_secs_f64());

        result.map_err(|e| {
            UPSTREAM_FAILURES.inc();
            GatewayError::upstream(e.to_string(), prompt)
        })
    }

    // Digests are compared so the comparison length never depends on the token
    fn authorized(&self, auth_token: &str) -> bool {
        match &self.settings.purge_secret {
            Some(secret) if !secret.is_empty() => {
                Sha256::digest(secret.as_bytes()) == Sha256::digest(auth_token.as_bytes())
            }
            _ => false,
        }
    }
}
