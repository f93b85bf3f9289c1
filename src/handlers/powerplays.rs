use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Map, Value, json};

use crate::error::GatewayError;
use crate::models::EmailQuery;
use crate::state::AppState;

pub async fn create_powerplay_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(body) = payload?;
    let powerplay = state.powerplays.create(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "PowerPlay created", "data": powerplay })),
    ))
}

pub async fn get_powerplays_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Query(query) = query?;
    let powerplays = state.powerplays.list(query.email.as_deref()).await?;
    Ok(Json(json!({ "powerplays": powerplays })))
}

// PATCH/PUT: set nested fields by dot-notation path, e.g. pinterest.niche.niche3
pub async fn update_powerplay_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(body) = payload?;
    let updated_fields = state.powerplays.update(body).await?;
    Ok(Json(json!({
        "message": "PowerPlay updated",
        "updated_fields": updated_fields
    })))
}

pub async fn delete_powerplays_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Query(query) = query?;
    let (email, deleted) = state.powerplays.delete_all(query.email.as_deref()).await?;
    Ok(Json(json!({
        "message": format!("Deleted {} PowerPlay record(s) for email: {}", deleted, email)
    })))
}
