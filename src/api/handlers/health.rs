use crate::guard::GuardState;
use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{Instrument, error, info_span};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    name: String,
    version: String,
    store: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Key-value store is reachable", body = [Health]),
        (status = 503, description = "Key-value store is unreachable", body = [Health])
    ),
    tag = "health"
)]
// axum handler for health
pub async fn health(state: Extension<Arc<GuardState>>) -> impl IntoResponse {
    let ping_span = info_span!("store.ping", store.operation = "PING");
    let result = state.store().ping().instrument(ping_span).await;

    if let Err(error) = &result {
        error!("Failed to ping key-value store: {error}");
    }

    let health = Health {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: if result.is_ok() {
            "ok".to_string()
        } else {
            "error".to_string()
        },
    };

    let status = if result.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(health))
}
