use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::GatewayError;
use crate::metrics::REQUEST_TOTAL;
use crate::models::{ChatRequest, GenerationRequest, GptBody, GptQuery, Resolved, is_truthy};
use crate::state::AppState;

fn mode_is(mode: Option<&str>, expected: &str) -> bool {
    mode.is_some_and(|m| m.trim().eq_ignore_ascii_case(expected))
}

// 200 when served from the store, 201 when this request created the entry
fn resolved_response(resolved: Resolved) -> Response {
    let (status, cache) = if resolved.cache_hit {
        (StatusCode::OK, "HIT")
    } else {
        (StatusCode::CREATED, "MISS")
    };
    (status, [("x-cache", cache)], Json(resolved.entry)).into_response()
}

async fn purge(state: &AppState, auth_token: Option<&str>) -> Result<Response, GatewayError> {
    let deleted = state.gateway.purge_all(auth_token.unwrap_or_default()).await?;
    Ok(Json(serde_json::json!({
        "message": format!("Purged {} entries", deleted),
        "deleted": deleted
    }))
    .into_response())
}

// GET: purge, list, or cache-or-generate depending on the flags
pub async fn gpt_get_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<GptQuery>, QueryRejection>,
) -> Result<Response, GatewayError> {
    REQUEST_TOTAL.inc();
    let Query(query) = query?;

    if is_truthy(query.purge.as_deref()) {
        return purge(&state, query.auth_token.as_deref()).await;
    }

    if mode_is(query.mode.as_deref(), "list") {
        let entries = state.gateway.list_entries().await?;
        return Ok(Json(serde_json::json!({ "entries": entries })).into_response());
    }

    let request = GenerationRequest {
        key: query.key.unwrap_or_default(),
        prompt_text: query.prompt_text.unwrap_or_default(),
        auxiliary_tag: query.auxiliary_tag.unwrap_or_default(),
        cache_only: is_truthy(query.cache_only.as_deref()),
    };

    Ok(resolved_response(state.gateway.resolve(request).await?))
}

/// POST: chat passthrough when `mode=chat`, otherwise generate-and-store.
///
/// Generate-and-store never regenerates a key that is already stored: the
/// existing entry is returned with 200 and `x-cache: HIT`. Only a purge makes
/// a key generate again.
pub async fn gpt_post_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GptBody>, JsonRejection>,
) -> Result<Response, GatewayError> {
    REQUEST_TOTAL.inc();
    let Json(body) = payload?;

    if mode_is(body.mode.as_deref(), "chat") {
        let reply = state
            .gateway
            .chat(ChatRequest {
                message_text: body.message_text.unwrap_or_default(),
                model_identifier: body.model_identifier,
            })
            .await?;
        return Ok(Json(reply).into_response());
    }

    let (Some(key), Some(prompt_text)) = (body.key, body.prompt_text) else {
        return Err(GatewayError::validation(
            "Missing 'key' or 'promptText' in request body",
        ));
    };
    if prompt_text.trim().is_empty() {
        return Err(GatewayError::validation(
            "Missing 'key' or 'promptText' in request body",
        ));
    }

    let request = GenerationRequest {
        key,
        prompt_text,
        auxiliary_tag: body.auxiliary_tag.unwrap_or_default(),
        cache_only: false,
    };

    Ok(resolved_response(state.gateway.resolve(request).await?))
}

// DELETE: purge the whole generation cache
pub async fn gpt_delete_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<GptQuery>, QueryRejection>,
) -> Result<Response, GatewayError> {
    REQUEST_TOTAL.inc();
    let Query(query) = query?;
    purge(&state, query.auth_token.as_deref()).await
}
