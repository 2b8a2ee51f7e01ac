//! Guard error taxonomy.

/// Rejections surfaced by the guard layer.
///
/// `Throttled` and `Locked` both carry a retry-after hint and are mapped to
/// the same user-visible response shape so callers cannot distinguish a rate
/// budget from an account lock. `StoreUnavailable` is an infrastructure
/// failure, logged operationally and never treated as a security event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("Too many requests, retry in {retry_after_seconds}s")]
    Throttled { retry_after_seconds: u64 },

    #[error("Temporarily locked, retry in {retry_after_seconds}s")]
    Locked { retry_after_seconds: u64 },

    #[error("Not authorized")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("Key-value store unavailable")]
    StoreUnavailable,
}

impl GuardError {
    /// Retry hint, when the rejection has one.
    #[must_use]
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            Self::Throttled {
                retry_after_seconds,
            }
            | Self::Locked {
                retry_after_seconds,
            } => Some(*retry_after_seconds),
            _ => None,
        }
    }
}
