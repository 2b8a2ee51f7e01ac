//! Operator-only introspection endpoints.
//!
//! The caller's identity arrives in `x-operator-email`, set by the upstream
//! auth proxy. Non-operators get a rejection, never an empty list, so the
//! response does not hint at whether anything is currently locked.

use super::reject;
use crate::guard::GuardError;
use crate::guard::GuardState;
use crate::guard::admin::{IndexEntry, is_operator};
use axum::{
    Json,
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

const OPERATOR_HEADER: &str = "x-operator-email";

fn operator_email(headers: &HeaderMap, state: &GuardState) -> Result<String, GuardError> {
    let email = headers
        .get(OPERATOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(GuardError::Unauthorized)?;

    if !is_operator(email, state.config().operator_emails()) {
        warn!("Rejected non-operator introspection request");
        return Err(GuardError::Unauthorized);
    }

    Ok(email.to_string())
}

#[utoipa::path(
    get,
    path = "/v1/admin/locks",
    responses(
        (status = 200, description = "Currently locked identifiers with live TTLs", body = [IndexEntry]),
        (status = 403, description = "Caller is not an allow-listed operator", body = [super::ErrorBody]),
        (status = 503, description = "Store unavailable", body = [super::ErrorBody]),
    ),
    tag = "admin"
)]
// axum handler listing live locks
pub async fn list_locks(state: Extension<Arc<GuardState>>, headers: HeaderMap) -> Response {
    if let Err(err) = operator_email(&headers, &state) {
        return reject(&err);
    }

    match state.introspection().list_active_locks().await {
        Ok(entries) => Json(entries).into_response(),
        Err(err) => reject(&err),
    }
}

#[utoipa::path(
    get,
    path = "/v1/admin/audits",
    responses(
        (status = 200, description = "Currently tracked audit counters with live TTLs", body = [IndexEntry]),
        (status = 403, description = "Caller is not an allow-listed operator", body = [super::ErrorBody]),
        (status = 503, description = "Store unavailable", body = [super::ErrorBody]),
    ),
    tag = "admin"
)]
// axum handler listing live audit counters
pub async fn list_audits(state: Extension<Arc<GuardState>>, headers: HeaderMap) -> Response {
    if let Err(err) = operator_email(&headers, &state) {
        return reject(&err);
    }

    match state.introspection().list_audit_counters().await {
        Ok(entries) => Json(entries).into_response(),
        Err(err) => reject(&err),
    }
}
