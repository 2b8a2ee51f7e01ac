//! The guard layer proper.
//!
//! Components coordinate only through the shared key-value store; nothing
//! here holds cross-request state in process. `GuardState` wires them
//! together once at startup and is shared with the route handlers.

pub mod admin;
pub mod audit;
pub mod config;
pub mod emergency;
pub mod error;
pub mod keys;
pub mod lockout;
pub mod rate_limit;
pub mod tag;
pub mod utils;

pub use config::{FailPolicy, GuardConfig};
pub use error::GuardError;

use crate::store::KeyValueStore;
use std::sync::Arc;

pub struct GuardState {
    config: GuardConfig,
    store: Arc<dyn KeyValueStore>,
    rate_limiter: rate_limit::RateLimiter,
    lockout: lockout::LockoutManager,
    audit: audit::AuditRecorder,
    introspection: admin::Introspection,
    emergency: emergency::EmergencyAccess,
}

impl GuardState {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, config: GuardConfig) -> Self {
        let rate_limiter = rate_limit::RateLimiter::new(store.clone(), config.fail_policy());
        let lockout = lockout::LockoutManager::new(store.clone(), config.clone());
        let audit = audit::AuditRecorder::new(store.clone(), &config);
        let introspection = admin::Introspection::new(store.clone());
        let emergency = emergency::EmergencyAccess::new(
            store.clone(),
            config.clone(),
            rate_limiter.clone(),
            audit.clone(),
            introspection.clone(),
        );

        Self {
            config,
            store,
            rate_limiter,
            lockout,
            audit,
            introspection,
            emergency,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    #[must_use]
    pub fn rate_limiter(&self) -> &rate_limit::RateLimiter {
        &self.rate_limiter
    }

    #[must_use]
    pub fn lockout(&self) -> &lockout::LockoutManager {
        &self.lockout
    }

    #[must_use]
    pub fn audit(&self) -> &audit::AuditRecorder {
        &self.audit
    }

    #[must_use]
    pub fn introspection(&self) -> &admin::Introspection {
        &self.introspection
    }

    #[must_use]
    pub fn emergency(&self) -> &emergency::EmergencyAccess {
        &self.emergency
    }
}
