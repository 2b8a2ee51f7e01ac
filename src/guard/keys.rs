//! Store key construction.
//!
//! Key names are the only isolation mechanism inside the shared store, so
//! every key is built here and always scoped by action/event plus the hashed
//! identifier tag. Raw identifiers never reach a key.

/// Set of currently live lock keys, kept for operator enumeration.
pub const ACTIVE_LOCK_INDEX: &str = "index:lockout:active";

/// Set of currently tracked audit counter keys.
pub const AUDIT_INDEX: &str = "index:audit:active";

/// Set of `(event, tag, ip)` triples that crossed the alert threshold.
pub const SECURITY_ALERTS: &str = "alerts:security";

#[must_use]
pub fn rate_window(scope: &str) -> String {
    format!("ratelimit:{scope}")
}

#[must_use]
pub fn failure_counter(action: &str, tag: &str) -> String {
    format!("lockout:fail:{action}:{tag}")
}

#[must_use]
pub fn active_lock(action: &str, tag: &str) -> String {
    format!("lockout:lock:{action}:{tag}")
}

#[must_use]
pub fn audit_counter(event_type: &str, tag: &str, origin_ip: &str) -> String {
    format!("audit:{event_type}:{tag}:{origin_ip}")
}

/// Member stored in the security alert set for a tripped audit counter.
#[must_use]
pub fn alert_member(event_type: &str, tag: &str, origin_ip: &str) -> String {
    format!("{event_type}:{tag}:{origin_ip}")
}

#[must_use]
pub fn emergency_grant(tag: &str) -> String {
    format!("emergency:grant:{tag}")
}
