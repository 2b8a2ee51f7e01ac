//! Break-glass emergency access.
//!
//! A fixed, out-of-band operator allow-list may grant short-lived emergency
//! access, run a self-check, or pull a status report. The path is its own
//! worst-case abuse target, so it sits behind a tight per-IP rate gate and
//! every branch, success or failure, lands in the audit trail.

use crate::guard::admin::{Introspection, is_operator};
use crate::guard::audit::{
    AuditRecorder, EVENT_EMERGENCY_ACCESS_GRANTED, EVENT_EMERGENCY_SELF_CHECK,
    EVENT_EMERGENCY_STATUS_REPORT, EVENT_UNAUTHORIZED_EMERGENCY_ACCESS,
};
use crate::guard::config::GuardConfig;
use crate::guard::error::GuardError;
use crate::guard::keys;
use crate::guard::rate_limit::RateLimiter;
use crate::guard::tag::identifier_tag;
use crate::guard::utils::{normalize_email, valid_email};
use crate::store::KeyValueStore;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;

/// How long an emergency grant stays valid.
const GRANT_TTL_SECONDS: u64 = 15 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmergencyAction {
    GrantAccess,
    SelfCheck,
    Status,
}

impl EmergencyAction {
    #[must_use]
    pub fn parse(action: &str) -> Option<Self> {
        match action.trim().to_lowercase().as_str() {
            "grant-access" => Some(Self::GrantAccess),
            "self-check" => Some(Self::SelfCheck),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GrantAccess => "grant-access",
            Self::SelfCheck => "self-check",
            Self::Status => "status",
        }
    }

    fn audit_event(self) -> &'static str {
        match self {
            Self::GrantAccess => EVENT_EMERGENCY_ACCESS_GRANTED,
            Self::SelfCheck => EVENT_EMERGENCY_SELF_CHECK,
            Self::Status => EVENT_EMERGENCY_STATUS_REPORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmergencyOutcome {
    pub action: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Clone)]
pub struct EmergencyAccess {
    store: Arc<dyn KeyValueStore>,
    config: GuardConfig,
    rate_limiter: RateLimiter,
    audit: AuditRecorder,
    introspection: Introspection,
}

impl EmergencyAccess {
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        config: GuardConfig,
        rate_limiter: RateLimiter,
        audit: AuditRecorder,
        introspection: Introspection,
    ) -> Self {
        Self {
            store,
            config,
            rate_limiter,
            audit,
            introspection,
        }
    }

    /// Run one emergency request end to end.
    ///
    /// Gate order is fixed: rate limit by origin IP, syntactic email check,
    /// allow-list check (audited before rejecting), then the action itself.
    ///
    /// # Errors
    /// `Throttled`, `Validation`, `Unauthorized`, or `StoreUnavailable`.
    pub async fn request(
        &self,
        email: &str,
        action: EmergencyAction,
        origin_ip: &str,
    ) -> Result<EmergencyOutcome, GuardError> {
        let decision = self
            .rate_limiter
            .allow(
                &format!("emergency:{origin_ip}"),
                self.config.emergency_rate_limit(),
                self.config.emergency_rate_window_seconds(),
            )
            .await?;
        if !decision.allowed {
            warn!("Emergency access rate limited for {origin_ip}");
            return Err(GuardError::Throttled {
                retry_after_seconds: decision.reset_seconds,
            });
        }

        // Malformed input is rejected before any allow-list comparison and
        // is not a security event.
        let email = normalize_email(email);
        if !valid_email(&email) {
            return Err(GuardError::Validation("Invalid email format".to_string()));
        }

        if !is_operator(&email, self.config.operator_emails()) {
            // Audit first: the attempt must be on record even though the
            // caller only ever sees a generic rejection.
            self.audit
                .record(EVENT_UNAUTHORIZED_EMERGENCY_ACCESS, &email, origin_ip)
                .await;
            warn!("Unauthorized emergency access attempt from {origin_ip}");
            return Err(GuardError::Unauthorized);
        }

        let outcome = match action {
            EmergencyAction::GrantAccess => self.grant_access(&email).await?,
            EmergencyAction::SelfCheck => self.self_check().await,
            EmergencyAction::Status => self.status().await?,
        };

        self.audit.record(action.audit_event(), &email, origin_ip).await;
        info!("Emergency action {} completed", action.as_str());

        Ok(outcome)
    }

    /// Write a short-lived grant marker the caller's session layer can honor.
    async fn grant_access(&self, email: &str) -> Result<EmergencyOutcome, GuardError> {
        let tag = identifier_tag(email);
        self.store
            .set_ex(&keys::emergency_grant(&tag), "1", GRANT_TTL_SECONDS)
            .await
            .map_err(|err| {
                error!("Failed to write emergency grant: {err}");
                GuardError::StoreUnavailable
            })?;

        Ok(EmergencyOutcome {
            action: EmergencyAction::GrantAccess.as_str().to_string(),
            message: format!("Emergency access granted for {GRANT_TTL_SECONDS}s"),
            details: Some(json!({ "expires_in_seconds": GRANT_TTL_SECONDS })),
        })
    }

    /// Exercise the dependencies and report, without ever failing the call.
    async fn self_check(&self) -> EmergencyOutcome {
        let store_ok = match self.store.ping().await {
            Ok(()) => true,
            Err(err) => {
                warn!("Self-check store ping failed: {err}");
                false
            }
        };
        let operators_configured = !self.config.operator_emails().is_empty();

        EmergencyOutcome {
            action: EmergencyAction::SelfCheck.as_str().to_string(),
            message: if store_ok && operators_configured {
                "All checks passed".to_string()
            } else {
                "One or more checks failed".to_string()
            },
            details: Some(json!({
                "store": if store_ok { "ok" } else { "error" },
                "operators_configured": operators_configured,
                "failure_threshold": self.config.failure_threshold(),
                "lock_duration_seconds": self.config.lock_duration_seconds(),
            })),
        }
    }

    async fn status(&self) -> Result<EmergencyOutcome, GuardError> {
        let locks = self.introspection.list_active_locks().await?;
        let audits = self.introspection.list_audit_counters().await?;

        Ok(EmergencyOutcome {
            action: EmergencyAction::Status.as_str().to_string(),
            message: "Guard status".to_string(),
            details: Some(json!({
                "active_locks": locks.len(),
                "audit_counters": audits.len(),
            })),
        })
    }
}
