//! Operator introspection over the lock and audit indexes.
//!
//! The index sets are written separately from the keys they reference, so an
//! index member can outlive its key. Enumeration therefore re-reads every
//! member's live TTL and drops the dead ones; the index is advisory, the TTL
//! is authoritative.

use crate::guard::error::GuardError;
use crate::guard::keys;
use crate::guard::utils::normalize_email;
use crate::store::KeyValueStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

/// One live indexed key and how long it has left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct IndexEntry {
    pub key: String,
    pub ttl_seconds: i64,
}

/// Membership check against the operator allow-list.
#[must_use]
pub fn is_operator(email: &str, allow_list: &[String]) -> bool {
    let normalized = normalize_email(email);
    !normalized.is_empty() && allow_list.iter().any(|operator| *operator == normalized)
}

#[derive(Clone)]
pub struct Introspection {
    store: Arc<dyn KeyValueStore>,
}

impl Introspection {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Currently locked identifiers (as lock keys with live TTLs).
    ///
    /// # Errors
    /// Returns `StoreUnavailable` if the index cannot be read.
    pub async fn list_active_locks(&self) -> Result<Vec<IndexEntry>, GuardError> {
        self.list_live(keys::ACTIVE_LOCK_INDEX).await
    }

    /// Currently tracked audit counters.
    ///
    /// # Errors
    /// Returns `StoreUnavailable` if the index cannot be read.
    pub async fn list_audit_counters(&self) -> Result<Vec<IndexEntry>, GuardError> {
        self.list_live(keys::AUDIT_INDEX).await
    }

    async fn list_live(&self, index_key: &str) -> Result<Vec<IndexEntry>, GuardError> {
        let members = self.store.smembers(index_key).await.map_err(|err| {
            error!("Failed to read index {index_key}: {err}");
            GuardError::StoreUnavailable
        })?;

        let mut entries = Vec::with_capacity(members.len());
        for key in members {
            match self.store.ttl(&key).await {
                // TTL <= 0 means the indexed key already expired; never
                // report a dead entry as live.
                Ok(ttl) if ttl > 0 => entries.push(IndexEntry {
                    key,
                    ttl_seconds: ttl,
                }),
                Ok(_) => {}
                Err(err) => {
                    error!("Failed to read TTL for indexed key {key}: {err}");
                }
            }
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::config::GuardConfig;
    use crate::guard::lockout::LockoutManager;
    use crate::store::MemoryStore;
    use crate::store::testing::DownStore;
    use std::time::Duration;

    fn allow_list() -> Vec<String> {
        vec!["ops@example.com".to_string(), "sre@example.com".to_string()]
    }

    #[test]
    fn operator_check_normalizes_the_candidate() {
        assert!(is_operator(" Ops@Example.COM ", &allow_list()));
        assert!(!is_operator("intruder@example.com", &allow_list()));
        assert!(!is_operator("", &allow_list()));
        assert!(!is_operator("ops@example.com", &[]));
    }

    #[tokio::test]
    async fn live_locks_are_listed_with_their_ttl() {
        let store = Arc::new(MemoryStore::new());
        let lockout = LockoutManager::new(store.clone(), GuardConfig::new());
        for _ in 0..5 {
            lockout
                .record_outcome("login", "user@example.com", false)
                .await
                .unwrap();
        }

        let entries = Introspection::new(store)
            .list_active_locks()
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].key.starts_with("lockout:lock:login:"));
        assert!(entries[0].ttl_seconds > 0 && entries[0].ttl_seconds <= 900);
    }

    #[tokio::test]
    async fn dead_index_members_are_filtered_out() {
        let store = Arc::new(MemoryStore::new());
        // Index member with no backing key at all.
        store
            .sadd(keys::ACTIVE_LOCK_INDEX, "lockout:lock:login:deadbeef0000")
            .await
            .unwrap();
        // Index member whose key expires before the index does.
        store.set_ex("lockout:lock:login:cafe00000000", "1", 10).await.unwrap();
        store
            .sadd(keys::ACTIVE_LOCK_INDEX, "lockout:lock:login:cafe00000000")
            .await
            .unwrap();

        let introspection = Introspection::new(store.clone());
        assert_eq!(introspection.list_active_locks().await.unwrap().len(), 1);

        store.advance_clock(Duration::from_secs(11)).await;
        assert!(introspection.list_active_locks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_audit_index_lists_nothing() {
        let introspection = Introspection::new(Arc::new(MemoryStore::new()));
        assert!(introspection.list_audit_counters().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreadable_index_is_an_error_not_an_empty_list() {
        let introspection = Introspection::new(Arc::new(DownStore));
        assert_eq!(
            introspection.list_active_locks().await.unwrap_err(),
            GuardError::StoreUnavailable
        );
    }
}
