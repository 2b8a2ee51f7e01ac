use crate::api::handlers::{self, admin, audit, emergency, health, lockout, ratelimit};
use crate::guard::{admin::IndexEntry, emergency::EmergencyOutcome, lockout::LockStatus};
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        ratelimit::check,
        lockout::check,
        lockout::outcome,
        audit::record,
        emergency::request,
        admin::list_locks,
        admin::list_audits,
    ),
    components(schemas(
        handlers::ErrorBody,
        health::Health,
        ratelimit::RateCheckRequest,
        ratelimit::RateCheckResponse,
        lockout::LockCheckRequest,
        lockout::OutcomeRequest,
        LockStatus,
        audit::AuditRequest,
        emergency::EmergencyRequest,
        EmergencyOutcome,
        IndexEntry,
    )),
    tags(
        (name = "health", description = "Service and store health"),
        (name = "guard", description = "Rate limit, lockout and audit contracts"),
        (name = "emergency", description = "Break-glass operator access"),
        (name = "admin", description = "Operator introspection"),
    ),
    info(
        title = "gardisto",
        description = "Security guard layer: distributed rate limiting, account lockout and audit alerting",
    )
)]
pub struct ApiDoc;

// axum handler serving the generated OpenAPI document
pub async fn serve() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
