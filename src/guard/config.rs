//! Guard configuration and the fail-open/fail-closed policy knob.

pub const DEFAULT_FAILURE_THRESHOLD: i64 = 5;
pub const DEFAULT_FAILURE_WINDOW_SECONDS: u64 = 10 * 60;
pub const DEFAULT_LOCK_DURATION_SECONDS: u64 = 15 * 60;
pub const DEFAULT_AUDIT_WINDOW_SECONDS: u64 = 10 * 60;
pub const DEFAULT_ALERT_THRESHOLD: i64 = 20;
pub const DEFAULT_EMERGENCY_RATE_LIMIT: i64 = 5;
pub const DEFAULT_EMERGENCY_RATE_WINDOW_SECONDS: u64 = 60 * 60;

/// What a guard does when the key-value store is unreachable.
///
/// `Open` keeps the request path available at the cost of enforcement;
/// `Closed` rejects with `StoreUnavailable`. Every deployment picks one
/// explicitly; audit recording always degrades silently regardless.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailPolicy {
    Open,
    Closed,
}

#[derive(Clone, Debug)]
pub struct GuardConfig {
    failure_threshold: i64,
    failure_window_seconds: u64,
    lock_duration_seconds: u64,
    audit_window_seconds: u64,
    alert_threshold: i64,
    emergency_rate_limit: i64,
    emergency_rate_window_seconds: u64,
    fail_policy: FailPolicy,
    operator_emails: Vec<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GuardConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            failure_window_seconds: DEFAULT_FAILURE_WINDOW_SECONDS,
            lock_duration_seconds: DEFAULT_LOCK_DURATION_SECONDS,
            audit_window_seconds: DEFAULT_AUDIT_WINDOW_SECONDS,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            emergency_rate_limit: DEFAULT_EMERGENCY_RATE_LIMIT,
            emergency_rate_window_seconds: DEFAULT_EMERGENCY_RATE_WINDOW_SECONDS,
            fail_policy: FailPolicy::Closed,
            operator_emails: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_failure_threshold(mut self, threshold: i64) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    #[must_use]
    pub fn with_failure_window_seconds(mut self, seconds: u64) -> Self {
        self.failure_window_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_lock_duration_seconds(mut self, seconds: u64) -> Self {
        self.lock_duration_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_audit_window_seconds(mut self, seconds: u64) -> Self {
        self.audit_window_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_alert_threshold(mut self, threshold: i64) -> Self {
        self.alert_threshold = threshold.max(1);
        self
    }

    #[must_use]
    pub fn with_emergency_rate_limit(mut self, limit: i64) -> Self {
        self.emergency_rate_limit = limit.max(1);
        self
    }

    #[must_use]
    pub fn with_emergency_rate_window_seconds(mut self, seconds: u64) -> Self {
        self.emergency_rate_window_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_fail_policy(mut self, policy: FailPolicy) -> Self {
        self.fail_policy = policy;
        self
    }

    /// Operator allow-list, normalized on the way in.
    #[must_use]
    pub fn with_operator_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.operator_emails = emails
            .into_iter()
            .map(|email| email.as_ref().trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .collect();
        self
    }

    #[must_use]
    pub fn failure_threshold(&self) -> i64 {
        self.failure_threshold
    }

    #[must_use]
    pub fn failure_window_seconds(&self) -> u64 {
        self.failure_window_seconds
    }

    #[must_use]
    pub fn lock_duration_seconds(&self) -> u64 {
        self.lock_duration_seconds
    }

    #[must_use]
    pub fn audit_window_seconds(&self) -> u64 {
        self.audit_window_seconds
    }

    #[must_use]
    pub fn alert_threshold(&self) -> i64 {
        self.alert_threshold
    }

    #[must_use]
    pub fn emergency_rate_limit(&self) -> i64 {
        self.emergency_rate_limit
    }

    #[must_use]
    pub fn emergency_rate_window_seconds(&self) -> u64 {
        self.emergency_rate_window_seconds
    }

    #[must_use]
    pub fn fail_policy(&self) -> FailPolicy {
        self.fail_policy
    }

    #[must_use]
    pub fn operator_emails(&self) -> &[String] {
        &self.operator_emails
    }
}
