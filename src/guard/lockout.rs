//! Progressive account lockout.
//!
//! Per `(action, tag)` the state machine moves Unlocked → Accumulating →
//! Locked. Failures increment a windowed counter; reaching the threshold
//! creates a lock key whose TTL is the only exit back to Unlocked. A success
//! wipes both keys. The failure window and the lock duration run on
//! independent clocks.

use crate::guard::config::{FailPolicy, GuardConfig};
use crate::guard::error::GuardError;
use crate::guard::keys;
use crate::guard::tag::identifier_tag;
use crate::store::KeyValueStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;

/// Lock state reported to callers.
///
/// `retry_after_seconds` is present while locked; `remaining_attempts` is
/// present after a counted failure below the threshold. Both stay out of the
/// payload otherwise so responses leak nothing about internal counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct LockStatus {
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<i64>,
}

impl LockStatus {
    #[must_use]
    pub fn clear() -> Self {
        Self {
            locked: false,
            retry_after_seconds: None,
            remaining_attempts: None,
        }
    }

    #[must_use]
    pub fn locked(retry_after_seconds: u64) -> Self {
        Self {
            locked: true,
            retry_after_seconds: Some(retry_after_seconds),
            remaining_attempts: None,
        }
    }

    #[must_use]
    pub fn accumulating(remaining_attempts: i64) -> Self {
        Self {
            locked: false,
            retry_after_seconds: None,
            remaining_attempts: Some(remaining_attempts),
        }
    }
}

#[derive(Clone)]
pub struct LockoutManager {
    store: Arc<dyn KeyValueStore>,
    config: GuardConfig,
}

impl LockoutManager {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, config: GuardConfig) -> Self {
        Self { store, config }
    }

    /// Read-only pre-flight gate: is this identifier currently locked?
    ///
    /// # Errors
    /// Returns `StoreUnavailable` on store failure with fail-closed policy.
    pub async fn check_lock(
        &self,
        action: &str,
        raw_identifier: &str,
    ) -> Result<LockStatus, GuardError> {
        let tag = identifier_tag(raw_identifier);
        let lock_key = keys::active_lock(action, &tag);

        match self.store.ttl(&lock_key).await {
            Ok(ttl) if ttl > 0 => Ok(LockStatus::locked(u64::try_from(ttl).unwrap_or(0))),
            Ok(_) => Ok(LockStatus::clear()),
            Err(err) => {
                error!("Lock check failed for action {action}: {err}");
                self.on_store_error()
            }
        }
    }

    /// Report the outcome of a protected operation and get the new state.
    ///
    /// Success clears both the failure counter and any lock. A failure while
    /// already locked only reports the lock; it never pushes the lock TTL.
    ///
    /// # Errors
    /// Returns `StoreUnavailable` on store failure with fail-closed policy.
    pub async fn record_outcome(
        &self,
        action: &str,
        raw_identifier: &str,
        success: bool,
    ) -> Result<LockStatus, GuardError> {
        let tag = identifier_tag(raw_identifier);
        let fail_key = keys::failure_counter(action, &tag);
        let lock_key = keys::active_lock(action, &tag);

        if success {
            if let Err(err) = self.store.del(&[&fail_key, &lock_key]).await {
                error!("Failed to clear lockout state for action {action}: {err}");
                return self.on_store_error();
            }
            return Ok(LockStatus::clear());
        }

        // Checked before counting so a locked identity cannot keep failing
        // its way into a longer lock.
        match self.store.ttl(&lock_key).await {
            Ok(ttl) if ttl > 0 => {
                return Ok(LockStatus::locked(u64::try_from(ttl).unwrap_or(0)));
            }
            Ok(_) => {}
            Err(err) => {
                error!("Lock check failed for action {action}: {err}");
                return self.on_store_error();
            }
        }

        let count = match self.store.incr(&fail_key).await {
            Ok(count) => count,
            Err(err) => {
                error!("Failure count increment failed for action {action}: {err}");
                return self.on_store_error();
            }
        };

        // First failure in the window owns the counter TTL.
        if count == 1 {
            if let Err(err) = self
                .store
                .expire(&fail_key, self.config.failure_window_seconds())
                .await
            {
                warn!("Failed to set failure window TTL for action {action}: {err}");
            }
        }

        if count < self.config.failure_threshold() {
            return Ok(LockStatus::accumulating(
                self.config.failure_threshold() - count,
            ));
        }

        self.create_lock(action, &tag, &fail_key, &lock_key).await
    }

    /// Threshold reached: create the lock, retire the counter, index the lock.
    async fn create_lock(
        &self,
        action: &str,
        tag: &str,
        fail_key: &str,
        lock_key: &str,
    ) -> Result<LockStatus, GuardError> {
        let lock_seconds = self.config.lock_duration_seconds();

        if let Err(err) = self.store.set_ex(lock_key, "1", lock_seconds).await {
            error!("Failed to create lock for action {action}: {err}");
            return self.on_store_error();
        }

        info!("Locked {tag} for action {action} ({lock_seconds}s)");

        // The counter's window and the lock's window are independent clocks;
        // dropping the counter here means a fresh count after the lock ends.
        if let Err(err) = self.store.del(&[fail_key]).await {
            warn!("Failed to drop failure counter for action {action}: {err}");
        }

        // Index upkeep is best effort: enumeration re-checks live TTLs anyway.
        if let Err(err) = self.store.sadd(keys::ACTIVE_LOCK_INDEX, lock_key).await {
            warn!("Failed to index lock for action {action}: {err}");
        } else {
            let index_ttl = lock_seconds.max(self.config.failure_window_seconds());
            if let Err(err) = self.store.expire(keys::ACTIVE_LOCK_INDEX, index_ttl).await {
                warn!("Failed to refresh lock index TTL: {err}");
            }
        }

        Ok(LockStatus::locked(lock_seconds))
    }

    fn on_store_error(&self) -> Result<LockStatus, GuardError> {
        match self.config.fail_policy() {
            FailPolicy::Open => {
                warn!("Store unavailable, lockout failing open");
                Ok(LockStatus::clear())
            }
            FailPolicy::Closed => Err(GuardError::StoreUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::store::testing::DownStore;
    use std::time::Duration;

    fn manager(store: Arc<MemoryStore>) -> LockoutManager {
        LockoutManager::new(store, GuardConfig::new())
    }

    const USER: &str = "user@example.com";

    #[tokio::test]
    async fn below_threshold_never_locks() {
        let lockout = manager(Arc::new(MemoryStore::new()));

        for expected_remaining in (1..=4).rev() {
            let status = lockout.record_outcome("login", USER, false).await.unwrap();
            assert!(!status.locked);
            assert_eq!(status.remaining_attempts, Some(expected_remaining));
        }

        let status = lockout.check_lock("login", USER).await.unwrap();
        assert!(!status.locked);
    }

    #[tokio::test]
    async fn threshold_failure_locks_for_the_full_duration() {
        let lockout = manager(Arc::new(MemoryStore::new()));

        for _ in 0..4 {
            lockout.record_outcome("login", USER, false).await.unwrap();
        }
        let status = lockout.record_outcome("login", USER, false).await.unwrap();
        assert!(status.locked);
        assert_eq!(status.retry_after_seconds, Some(900));

        let status = lockout.check_lock("login", USER).await.unwrap();
        assert!(status.locked);
        assert!(status.retry_after_seconds.unwrap_or(0) > 0);
    }

    #[tokio::test]
    async fn failures_while_locked_do_not_extend_the_lock() {
        let store = Arc::new(MemoryStore::new());
        let lockout = manager(store.clone());

        for _ in 0..5 {
            lockout.record_outcome("login", USER, false).await.unwrap();
        }

        store.advance_clock(Duration::from_secs(300)).await;
        let status = lockout.record_outcome("login", USER, false).await.unwrap();
        assert!(status.locked);
        // 600s of the 900s lock remain; a sliding lock would report 900 again.
        let remaining = status.retry_after_seconds.unwrap();
        assert!(remaining <= 600, "lock was extended: {remaining}s");

        // And the extra failure counted nothing: after expiry we start clean.
        store.advance_clock(Duration::from_secs(601)).await;
        let status = lockout.record_outcome("login", USER, false).await.unwrap();
        assert_eq!(status.remaining_attempts, Some(4));
    }

    #[tokio::test]
    async fn success_resets_accumulated_failures() {
        let lockout = manager(Arc::new(MemoryStore::new()));

        for _ in 0..4 {
            lockout.record_outcome("login", USER, false).await.unwrap();
        }
        let status = lockout.record_outcome("login", USER, true).await.unwrap();
        assert!(!status.locked);

        // Accumulation restarts from one, not from where it left off.
        let status = lockout.record_outcome("login", USER, false).await.unwrap();
        assert_eq!(status.remaining_attempts, Some(4));
    }

    #[tokio::test]
    async fn success_also_clears_an_active_lock() {
        let lockout = manager(Arc::new(MemoryStore::new()));

        for _ in 0..5 {
            lockout.record_outcome("login", USER, false).await.unwrap();
        }
        assert!(lockout.check_lock("login", USER).await.unwrap().locked);

        lockout.record_outcome("login", USER, true).await.unwrap();
        assert!(!lockout.check_lock("login", USER).await.unwrap().locked);
    }

    #[tokio::test]
    async fn lock_expires_on_its_own() {
        let store = Arc::new(MemoryStore::new());
        let lockout = manager(store.clone());

        for _ in 0..5 {
            lockout.record_outcome("login", USER, false).await.unwrap();
        }

        store.advance_clock(Duration::from_secs(901)).await;
        assert!(!lockout.check_lock("login", USER).await.unwrap().locked);
    }

    #[tokio::test]
    async fn actions_and_identifiers_are_isolated() {
        let lockout = manager(Arc::new(MemoryStore::new()));

        for _ in 0..5 {
            lockout.record_outcome("login", USER, false).await.unwrap();
        }

        assert!(!lockout.check_lock("reset", USER).await.unwrap().locked);
        assert!(
            !lockout
                .check_lock("login", "other@example.com")
                .await
                .unwrap()
                .locked
        );
    }

    #[tokio::test]
    async fn locked_keys_land_in_the_index() {
        let store = Arc::new(MemoryStore::new());
        let lockout = manager(store.clone());

        for _ in 0..5 {
            lockout.record_outcome("login", USER, false).await.unwrap();
        }

        let members = store.smembers(keys::ACTIVE_LOCK_INDEX).await.unwrap();
        let tag = identifier_tag(USER);
        assert_eq!(members, vec![keys::active_lock("login", &tag)]);
    }

    #[tokio::test]
    async fn store_outage_honors_fail_policy() {
        let closed = LockoutManager::new(Arc::new(DownStore), GuardConfig::new());
        assert_eq!(
            closed.check_lock("login", USER).await.unwrap_err(),
            GuardError::StoreUnavailable
        );
        assert_eq!(
            closed.record_outcome("login", USER, false).await.unwrap_err(),
            GuardError::StoreUnavailable
        );

        let open = LockoutManager::new(
            Arc::new(DownStore),
            GuardConfig::new().with_fail_policy(FailPolicy::Open),
        );
        assert!(!open.check_lock("login", USER).await.unwrap().locked);
        assert!(!open.record_outcome("login", USER, false).await.unwrap().locked);
    }
}
