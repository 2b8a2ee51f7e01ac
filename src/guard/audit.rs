//! Security audit recorder.
//!
//! Counts security-relevant events per `(event type, identifier tag, origin
//! IP)` and raises an alert marker when a counter crosses the threshold
//! inside the window. Strictly best effort: a failing store costs
//! observability, never the request that was being audited.

use crate::guard::config::GuardConfig;
use crate::guard::keys;
use crate::guard::tag::audit_identifier_tag;
use crate::store::KeyValueStore;
use std::sync::Arc;
use tracing::{info, warn};

pub const EVENT_UNAUTHORIZED_EMERGENCY_ACCESS: &str = "UNAUTHORIZED_EMERGENCY_ACCESS_ATTEMPT";
pub const EVENT_EMERGENCY_ACCESS_GRANTED: &str = "EMERGENCY_ACCESS_GRANTED";
pub const EVENT_EMERGENCY_SELF_CHECK: &str = "EMERGENCY_SELF_CHECK";
pub const EVENT_EMERGENCY_STATUS_REPORT: &str = "EMERGENCY_STATUS_REPORT";

#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn KeyValueStore>,
    window_seconds: u64,
    alert_threshold: i64,
}

impl AuditRecorder {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, config: &GuardConfig) -> Self {
        Self {
            store,
            window_seconds: config.audit_window_seconds(),
            alert_threshold: config.alert_threshold(),
        }
    }

    /// Tally one event. Fire-and-forget: every store error is swallowed here.
    pub async fn record(&self, event_type: &str, raw_identifier: &str, origin_ip: &str) {
        let tag = audit_identifier_tag(raw_identifier);
        let key = keys::audit_counter(event_type, &tag, origin_ip);

        let count = match self.store.incr(&key).await {
            Ok(count) => count,
            Err(err) => {
                warn!("Audit increment failed for {event_type}: {err}");
                return;
            }
        };

        if count == 1 {
            if let Err(err) = self.store.expire(&key, self.window_seconds).await {
                warn!("Failed to set audit window TTL for {event_type}: {err}");
            }
        }

        match self.store.sadd(keys::AUDIT_INDEX, &key).await {
            Ok(_) => {
                if let Err(err) = self
                    .store
                    .expire(keys::AUDIT_INDEX, self.window_seconds)
                    .await
                {
                    warn!("Failed to refresh audit index TTL: {err}");
                }
            }
            Err(err) => warn!("Failed to index audit counter for {event_type}: {err}"),
        }

        if count >= self.alert_threshold {
            self.raise_alert(event_type, &tag, origin_ip).await;
        }
    }

    async fn raise_alert(&self, event_type: &str, tag: &str, origin_ip: &str) {
        info!("Audit volume alert: {event_type} from {origin_ip}");

        let member = keys::alert_member(event_type, tag, origin_ip);
        match self.store.sadd(keys::SECURITY_ALERTS, &member).await {
            Ok(_) => {
                if let Err(err) = self
                    .store
                    .expire(keys::SECURITY_ALERTS, self.window_seconds)
                    .await
                {
                    warn!("Failed to set alert marker TTL: {err}");
                }
            }
            Err(err) => warn!("Failed to raise security alert for {event_type}: {err}"),
        }
    }
}
