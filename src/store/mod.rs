//! Key-value store seam.
//!
//! All cross-request state (counters, locks, indexes, alert markers) lives in
//! an external store with per-key expiry. The trait mirrors the handful of
//! primitives the guard layer needs; TTL values follow the usual convention:
//! `-2` means the key does not exist, `-1` means it exists without expiry.

use anyhow::Result;
use async_trait::async_trait;

mod memory;
mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Atomically increment a counter key, creating it at 1 if absent.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Set a key's TTL in seconds. Returns false if the key does not exist.
    async fn expire(&self, key: &str, seconds: u64) -> Result<bool>;

    /// Remaining TTL in seconds (`-2` missing, `-1` no expiry).
    async fn ttl(&self, key: &str) -> Result<i64>;

    /// Set a string value with a TTL in one operation.
    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<()>;

    /// Delete keys, returning how many existed.
    async fn del(&self, keys: &[&str]) -> Result<u64>;

    /// Add a member to a set. Returns true if the member was new.
    async fn sadd(&self, key: &str, member: &str) -> Result<bool>;

    /// All members of a set; empty if the set does not exist.
    async fn smembers(&self, key: &str) -> Result<Vec<String>>;

    /// Connectivity probe for health reporting.
    async fn ping(&self) -> Result<()>;
}
