use super::reject;
use crate::guard::GuardError;
use crate::guard::GuardState;
use crate::guard::emergency::{EmergencyAction, EmergencyOutcome};
use crate::guard::utils::extract_client_ip;
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct EmergencyRequest {
    pub email: String,
    /// One of `grant-access`, `self-check`, `status`.
    pub action: String,
}

#[utoipa::path(
    post,
    path = "/v1/emergency",
    request_body = EmergencyRequest,
    responses(
        (status = 200, description = "Emergency action completed", body = [EmergencyOutcome]),
        (status = 400, description = "Malformed payload, email, or action", body = [super::ErrorBody]),
        (status = 403, description = "Caller is not an allow-listed operator", body = [super::ErrorBody]),
        (status = 429, description = "Emergency rate budget exceeded", body = [super::ErrorBody]),
        (status = 503, description = "Store unavailable", body = [super::ErrorBody]),
    ),
    tag = "emergency"
)]
// axum handler for the break-glass path
pub async fn request(
    state: Extension<Arc<GuardState>>,
    headers: HeaderMap,
    payload: Option<Json<EmergencyRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let Some(action) = EmergencyAction::parse(&request.action) else {
        return reject(&GuardError::Validation(format!(
            "Unknown emergency action: {}",
            request.action
        )));
    };

    let origin_ip = extract_client_ip(&headers).unwrap_or_else(|| "unknown".to_string());

    match state
        .emergency()
        .request(&request.email, action, &origin_ip)
        .await
    {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => reject(&err),
    }
}
