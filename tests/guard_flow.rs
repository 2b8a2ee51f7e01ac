//! End-to-end flows through the guard API router.
//!
//! Drives the real router over an in-process store: lockout escalation,
//! throttling, the break-glass path, and operator introspection, including
//! the audit trail each of them leaves behind.

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use gardisto::api;
use gardisto::guard::{GuardConfig, GuardState};
use gardisto::store::MemoryStore;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const OPERATOR: &str = "ops@example.com";

fn test_router() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let config = GuardConfig::new().with_operator_emails([OPERATOR]);
    let state = Arc::new(GuardState::new(store.clone(), config));
    (api::router(state), store)
}

async fn post_json(router: &Router, uri: &str, body: &Value) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.7")
        .body(Body::from(body.to_string()))?;

    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}

async fn get_as(router: &Router, uri: &str, operator: Option<&str>) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(email) = operator {
        builder = builder.header("x-operator-email", email);
    }
    let response = router.clone().oneshot(builder.body(Body::empty())?).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}

#[tokio::test]
async fn health_reports_store_status() -> Result<()> {
    let (router, _store) = test_router();
    let (status, body) = get_as(&router, "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "ok");
    assert_eq!(body["name"], "gardisto");
    Ok(())
}

#[tokio::test]
async fn five_failures_lock_and_a_sixth_changes_nothing() -> Result<()> {
    let (router, _store) = test_router();
    let outcome = json!({
        "action": "login",
        "identifier": "user@example.com",
        "success": false
    });

    for expected_remaining in (1..=4).rev() {
        let (status, body) = post_json(&router, "/v1/lockout/outcome", &outcome).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["locked"], false);
        assert_eq!(body["remaining_attempts"], expected_remaining);
    }

    let (status, body) = post_json(&router, "/v1/lockout/outcome", &outcome).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["locked"], true);
    assert_eq!(body["retry_after_seconds"], 900);

    // Failing while locked reports the same lock, never a fresh 900s one.
    let (status, body) = post_json(&router, "/v1/lockout/outcome", &outcome).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["locked"], true);
    assert!(body["retry_after_seconds"].as_u64().unwrap() <= 900);

    // Pre-flight check agrees.
    let check = json!({ "action": "login", "identifier": "user@example.com" });
    let (status, body) = post_json(&router, "/v1/lockout/check", &check).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["locked"], true);
    Ok(())
}

#[tokio::test]
async fn success_resets_the_failure_count() -> Result<()> {
    let (router, _store) = test_router();
    let fail = json!({ "action": "login", "identifier": "user@example.com", "success": false });
    let succeed = json!({ "action": "login", "identifier": "user@example.com", "success": true });

    for _ in 0..4 {
        post_json(&router, "/v1/lockout/outcome", &fail).await?;
    }
    let (status, body) = post_json(&router, "/v1/lockout/outcome", &succeed).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["locked"], false);

    let (_, body) = post_json(&router, "/v1/lockout/outcome", &fail).await?;
    assert_eq!(body["remaining_attempts"], 4);
    Ok(())
}

#[tokio::test]
async fn rate_budget_is_enforced_per_scope() -> Result<()> {
    let (router, _store) = test_router();
    let check = json!({ "scope": "login:203.0.113.7", "limit": 2, "window_seconds": 60 });

    for _ in 0..2 {
        let (status, body) = post_json(&router, "/v1/ratelimit/check", &check).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["allowed"], true);
    }

    let (status, body) = post_json(&router, "/v1/ratelimit/check", &check).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], false);
    assert_eq!(body["remaining"], 0);
    assert!(body["reset_seconds"].as_u64().unwrap() > 0);
    Ok(())
}

#[tokio::test]
async fn locks_show_up_for_operators_only() -> Result<()> {
    let (router, _store) = test_router();
    let fail = json!({ "action": "login", "identifier": "victim@example.com", "success": false });
    for _ in 0..5 {
        post_json(&router, "/v1/lockout/outcome", &fail).await?;
    }

    let (status, body) = get_as(&router, "/v1/admin/locks", Some(OPERATOR)).await?;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(
        entries[0]["key"]
            .as_str()
            .unwrap()
            .starts_with("lockout:lock:login:")
    );
    assert!(entries[0]["ttl_seconds"].as_i64().unwrap() > 0);

    // No identity or a non-operator identity: rejection, not an empty list.
    let (status, _) = get_as(&router, "/v1/admin/locks", None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = get_as(&router, "/v1/admin/locks", Some("intruder@example.com")).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn expired_locks_vanish_from_the_admin_view() -> Result<()> {
    let (router, store) = test_router();
    let fail = json!({ "action": "login", "identifier": "victim@example.com", "success": false });
    for _ in 0..5 {
        post_json(&router, "/v1/lockout/outcome", &fail).await?;
    }

    store.advance_clock(Duration::from_secs(901)).await;

    let (status, body) = get_as(&router, "/v1/admin/locks", Some(OPERATOR)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
    Ok(())
}

#[tokio::test]
async fn audit_endpoint_accepts_and_counts() -> Result<()> {
    let (router, _store) = test_router();
    let event = json!({ "event_type": "LOGIN_FAILED", "identifier": "user@example.com" });

    let (status, _) = post_json(&router, "/v1/audit", &event).await?;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, body) = get_as(&router, "/v1/admin/audits", Some(OPERATOR)).await?;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(
        entries[0]["key"]
            .as_str()
            .unwrap()
            .starts_with("audit:LOGIN_FAILED:")
    );
    Ok(())
}

#[tokio::test]
async fn emergency_path_audits_unauthorized_attempts() -> Result<()> {
    let (router, _store) = test_router();

    let request = json!({ "email": "intruder@example.com", "action": "grant-access" });
    let (status, body) = post_json(&router, "/v1/emergency", &request).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Not authorized");

    let (_, body) = get_as(&router, "/v1/admin/audits", Some(OPERATOR)).await?;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(
        entries[0]["key"]
            .as_str()
            .unwrap()
            .starts_with("audit:UNAUTHORIZED_EMERGENCY_ACCESS_ATTEMPT:")
    );
    Ok(())
}

#[tokio::test]
async fn emergency_grant_succeeds_for_operators() -> Result<()> {
    let (router, _store) = test_router();

    let request = json!({ "email": OPERATOR, "action": "grant-access" });
    let (status, body) = post_json(&router, "/v1/emergency", &request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "grant-access");
    assert_eq!(body["details"]["expires_in_seconds"], 900);
    Ok(())
}

#[tokio::test]
async fn emergency_rejects_malformed_input() -> Result<()> {
    let (router, _store) = test_router();

    let bad_email = json!({ "email": "nope", "action": "status" });
    let (status, _) = post_json(&router, "/v1/emergency", &bad_email).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let bad_action = json!({ "email": OPERATOR, "action": "format-disk" });
    let (status, body) = post_json(&router, "/v1/emergency", &bad_action).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("format-disk"));
    Ok(())
}

#[tokio::test]
async fn throttled_responses_carry_retry_after() -> Result<()> {
    let (router, _store) = test_router();
    let request = json!({ "email": OPERATOR, "action": "status" });

    for _ in 0..5 {
        let (status, _) = post_json(&router, "/v1/emergency", &request).await?;
        assert_eq!(status, StatusCode::OK);
    }

    let raw = Request::builder()
        .method("POST")
        .uri("/v1/emergency")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.7")
        .body(Body::from(request.to_string()))?;
    let response = router.clone().oneshot(raw).await?;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap();
    assert!(retry_after > 0 && retry_after <= 3600);
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> Result<()> {
    let (router, _store) = test_router();
    let (status, body) = get_as(&router, "/api-docs/openapi.json", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "gardisto");
    Ok(())
}
