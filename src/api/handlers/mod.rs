//! Route handlers for the guard API.

pub mod admin;
pub mod audit;
pub mod emergency;
pub mod health;
pub mod lockout;
pub mod ratelimit;
pub mod root;

use crate::guard::GuardError;
use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

/// Error payload shared by every rejecting endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
}

/// Map a guard rejection onto an HTTP response.
///
/// Throttled and Locked share a status code on purpose: a caller cannot tell
/// a rate budget from an account lock, only how long to wait.
pub(crate) fn reject(err: &GuardError) -> Response {
    let status = match err {
        GuardError::Throttled { .. } | GuardError::Locked { .. } => StatusCode::TOO_MANY_REQUESTS,
        GuardError::Unauthorized => StatusCode::FORBIDDEN,
        GuardError::Validation(_) => StatusCode::BAD_REQUEST,
        GuardError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    };

    let retry_after_seconds = err.retry_after_seconds();
    let body = Json(ErrorBody {
        error: err.to_string(),
        retry_after_seconds,
    });

    match retry_after_seconds {
        Some(seconds) => {
            (status, [(header::RETRY_AFTER, seconds.to_string())], body).into_response()
        }
        None => (status, body).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_and_lock_share_a_status() {
        let throttled = reject(&GuardError::Throttled {
            retry_after_seconds: 30,
        });
        let locked = reject(&GuardError::Locked {
            retry_after_seconds: 900,
        });
        assert_eq!(throttled.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(locked.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            locked.headers().get(header::RETRY_AFTER).unwrap(),
            &"900".parse::<axum::http::HeaderValue>().unwrap()
        );
    }

    #[test]
    fn unauthorized_maps_to_forbidden_without_retry_hint() {
        let response = reject(&GuardError::Unauthorized);
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }

    #[test]
    fn store_outage_is_a_503() {
        let response = reject(&GuardError::StoreUnavailable);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
