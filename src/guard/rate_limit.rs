//! Fixed-window request counter backed by the shared store.
//!
//! One atomic increment per call; the increment that creates the key also
//! sets its TTL, so the counter disappears on its own at the window edge.

use crate::guard::config::FailPolicy;
use crate::guard::error::GuardError;
use crate::guard::keys;
use crate::store::KeyValueStore;
use std::sync::Arc;
use tracing::{error, warn};

/// Outcome of a rate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Requests left in the current window, never negative.
    pub remaining: i64,
    /// Seconds until the window resets.
    pub reset_seconds: u64,
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    fail_policy: FailPolicy,
}

impl RateLimiter {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, fail_policy: FailPolicy) -> Self {
        Self { store, fail_policy }
    }

    /// Count a request against `scope` and decide whether it fits the budget.
    ///
    /// # Errors
    /// Returns `StoreUnavailable` when the store fails and the configured
    /// policy is fail-closed; with fail-open the request is allowed instead.
    pub async fn allow(
        &self,
        scope: &str,
        limit: i64,
        window_seconds: u64,
    ) -> Result<RateDecision, GuardError> {
        let key = keys::rate_window(scope);

        let count = match self.store.incr(&key).await {
            Ok(count) => count,
            Err(err) => {
                error!("Rate limit increment failed for {scope}: {err}");
                return self.on_store_error();
            }
        };

        // Only the increment that created the key may set the TTL; a second
        // writer racing here must not push the window forward.
        if count == 1 {
            if let Err(err) = self.store.expire(&key, window_seconds).await {
                warn!("Failed to set rate window TTL for {scope}: {err}");
            }
        }

        let reset_seconds = match self.store.ttl(&key).await {
            Ok(ttl) if ttl > 0 => u64::try_from(ttl).unwrap_or(window_seconds),
            Ok(-1) => {
                // Counter survived without an expiry (interrupted creation);
                // repair it so the window still closes.
                warn!("Rate counter for {scope} had no TTL, re-arming window");
                if let Err(err) = self.store.expire(&key, window_seconds).await {
                    warn!("Failed to repair rate window TTL for {scope}: {err}");
                }
                window_seconds
            }
            Ok(_) => window_seconds,
            Err(err) => {
                warn!("Failed to read rate window TTL for {scope}: {err}");
                window_seconds
            }
        };

        Ok(RateDecision {
            allowed: count <= limit,
            remaining: (limit - count).max(0),
            reset_seconds,
        })
    }

    fn on_store_error(&self) -> Result<RateDecision, GuardError> {
        match self.fail_policy {
            FailPolicy::Open => {
                warn!("Store unavailable, rate limiter failing open");
                Ok(RateDecision {
                    allowed: true,
                    remaining: 0,
                    reset_seconds: 0,
                })
            }
            FailPolicy::Closed => Err(GuardError::StoreUnavailable),
        }
    }
}
