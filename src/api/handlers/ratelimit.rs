use super::reject;
use crate::guard::GuardState;
use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RateCheckRequest {
    /// Budget scope, e.g. `login:203.0.113.7`.
    pub scope: String,
    pub limit: i64,
    pub window_seconds: u64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RateCheckResponse {
    pub allowed: bool,
    pub remaining: i64,
    pub reset_seconds: u64,
}

#[utoipa::path(
    post,
    path = "/v1/ratelimit/check",
    request_body = RateCheckRequest,
    responses(
        (status = 200, description = "Request counted, decision returned", body = [RateCheckResponse]),
        (status = 400, description = "Missing or malformed payload", body = [super::ErrorBody]),
        (status = 503, description = "Store unavailable under fail-closed policy", body = [super::ErrorBody]),
    ),
    tag = "guard"
)]
// axum handler counting a request against a scope budget
pub async fn check(
    state: Extension<Arc<GuardState>>,
    payload: Option<Json<RateCheckRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    debug!("rate check: {:?}", request);

    match state
        .rate_limiter()
        .allow(&request.scope, request.limit, request.window_seconds)
        .await
    {
        Ok(decision) => Json(RateCheckResponse {
            allowed: decision.allowed,
            remaining: decision.remaining,
            reset_seconds: decision.reset_seconds,
        })
        .into_response(),
        Err(err) => reject(&err),
    }
}
