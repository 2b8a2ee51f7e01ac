use crate::guard::GuardState;
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
pub struct AuditRequest {
    /// Event type, e.g. `LOGIN_FAILED`.
    pub event_type: String,
    /// Raw identifier; truncated and hashed before any store access.
    pub identifier: String,
    /// Origin IP; falls back to proxy headers when absent.
    pub origin_ip: Option<String>,
}

#[utoipa::path(
    post,
    path = "/v1/audit",
    request_body = AuditRequest,
    responses(
        (status = 202, description = "Event accepted; recording is best effort"),
        (status = 400, description = "Missing or malformed payload", body = [super::ErrorBody]),
    ),
    tag = "guard"
)]
// axum handler tallying a security event, always fire-and-forget
pub async fn record(
    state: Extension<Arc<GuardState>>,
    headers: HeaderMap,
    payload: Option<Json<AuditRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let origin_ip = request
        .origin_ip
        .or_else(|| extract_client_ip(&headers))
        .unwrap_or_else(|| "unknown".to_string());

    state
        .audit()
        .record(&request.event_type, &request.identifier, &origin_ip)
        .await;

    StatusCode::ACCEPTED.into_response()
}
