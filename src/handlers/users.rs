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
use serde_json::json;

use crate::error::GatewayError;
use crate::models::EmailQuery;
use crate::records::UserInput;
use crate::state::AppState;

pub async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(input) = payload?;
    let user = state.users.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created", "data": user })),
    ))
}

pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Query(query) = query?;
    let user = state.users.get(query.email.as_deref()).await?;
    Ok(Json(user))
}

pub async fn update_user_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(input) = payload?;
    let fields = state.users.update(input).await?;
    Ok(Json(json!({ "message": "User updated", "fields": fields })))
}

pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Query(query) = query?;
    let email = state.users.delete(query.email.as_deref()).await?;
    Ok(Json(json!({ "message": "User deleted", "email": email })))
}
