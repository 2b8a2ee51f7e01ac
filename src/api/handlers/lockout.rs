use super::reject;
use crate::guard::GuardState;
use crate::guard::lockout::LockStatus;
use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LockCheckRequest {
    /// Protected action, e.g. `login` or `password-reset`.
    pub action: String,
    /// Raw identifier; hashed before any store access.
    pub identifier: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OutcomeRequest {
    pub action: String,
    pub identifier: String,
    pub success: bool,
}

#[utoipa::path(
    post,
    path = "/v1/lockout/check",
    request_body = LockCheckRequest,
    responses(
        (status = 200, description = "Current lock state, read-only", body = [LockStatus]),
        (status = 400, description = "Missing or malformed payload", body = [super::ErrorBody]),
        (status = 503, description = "Store unavailable under fail-closed policy", body = [super::ErrorBody]),
    ),
    tag = "guard"
)]
// axum handler for the read-only pre-flight lock check
pub async fn check(
    state: Extension<Arc<GuardState>>,
    payload: Option<Json<LockCheckRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    match state
        .lockout()
        .check_lock(&request.action, &request.identifier)
        .await
    {
        Ok(status) => Json(status).into_response(),
        Err(err) => reject(&err),
    }
}

#[utoipa::path(
    post,
    path = "/v1/lockout/outcome",
    request_body = OutcomeRequest,
    responses(
        (status = 200, description = "Outcome recorded, new lock state returned", body = [LockStatus]),
        (status = 400, description = "Missing or malformed payload", body = [super::ErrorBody]),
        (status = 503, description = "Store unavailable under fail-closed policy", body = [super::ErrorBody]),
    ),
    tag = "guard"
)]
// axum handler reporting a success/failure outcome for a protected action
pub async fn outcome(
    state: Extension<Arc<GuardState>>,
    payload: Option<Json<OutcomeRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    match state
        .lockout()
        .record_outcome(&request.action, &request.identifier, request.success)
        .await
    {
        Ok(status) => Json(status).into_response(),
        Err(err) => reject(&err),
    }
}
