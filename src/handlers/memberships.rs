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
use crate::records::MembershipInput;
use crate::state::AppState;

pub async fn create_membership_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MembershipInput>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(input) = payload?;
    let membership = state.memberships.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Membership created", "data": membership })),
    ))
}

pub async fn get_membership_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Query(query) = query?;
    Ok(Json(state.memberships.get(query.email.as_deref()).await?))
}

pub async fn update_membership_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MembershipInput>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(input) = payload?;
    let fields = state.memberships.update(input).await?;
    Ok(Json(json!({ "message": "Membership updated", "fields": fields })))
}

pub async fn delete_membership_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Query(query) = query?;
    let email = state.memberships.delete(query.email.as_deref()).await?;
    Ok(Json(json!({ "message": "Membership deleted", "email": email })))
}
