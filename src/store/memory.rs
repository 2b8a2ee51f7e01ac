//! In-process store with deadline-based expiry.
//!
//! Backs unit and integration tests, and is good enough for single-instance
//! deployments where the guard state does not need to be shared.

use crate::store::KeyValueStore;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
enum Stored {
    Scalar(String),
    Set(HashSet<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Stored,
    deadline: Option<Instant>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    // Added to the real clock; lets tests move time forward without sleeping.
    skew: Duration,
}

impl Inner {
    fn now(&self) -> Instant {
        Instant::now() + self.skew
    }

    /// Drop the key if its deadline has passed, emulating store-side expiry.
    fn prune(&mut self, key: &str) {
        let now = self.now();
        let expired = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.deadline.is_some_and(|deadline| deadline <= now));
        if expired {
            self.entries.remove(key);
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the store's clock forward, expiring any key whose TTL elapses.
    pub async fn advance_clock(&self, duration: Duration) {
        let mut inner = self.inner.lock().await;
        inner.skew += duration;
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn incr(&self, key: &str) -> Result<i64> {
        let mut inner = self.inner.lock().await;
        inner.prune(key);

        let entry = inner.entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: Stored::Scalar("0".to_string()),
            deadline: None,
        });
        match &mut entry.value {
            Stored::Scalar(value) => {
                let count = value
                    .parse::<i64>()
                    .with_context(|| format!("key {key} holds a non-integer value"))?
                    + 1;
                *value = count.to_string();
                Ok(count)
            }
            Stored::Set(_) => Err(anyhow!("key {key} holds a set")),
        }
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        inner.prune(key);

        let deadline = inner.now() + Duration::from_secs(seconds);
        match inner.entries.get_mut(key) {
            Some(entry) => {
                entry.deadline = Some(deadline);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        let mut inner = self.inner.lock().await;
        inner.prune(key);

        let now = inner.now();
        match inner.entries.get(key) {
            None => Ok(-2),
            Some(Entry { deadline: None, .. }) => Ok(-1),
            Some(Entry {
                deadline: Some(deadline),
                ..
            }) => {
                let remaining = deadline.saturating_duration_since(now);
                // Round sub-second remainders up, like a store returning whole seconds.
                let seconds = remaining.as_secs().max(1);
                Ok(i64::try_from(seconds).unwrap_or(i64::MAX))
            }
        }
    }

    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let deadline = inner.now() + Duration::from_secs(seconds);
        inner.entries.insert(
            key.to_string(),
            Entry {
                value: Stored::Scalar(value.to_string()),
                deadline: Some(deadline),
            },
        );
        Ok(())
    }

    async fn del(&self, keys: &[&str]) -> Result<u64> {
        let mut inner = self.inner.lock().await;
        let mut removed = 0;
        for key in keys {
            inner.prune(key);
            if inner.entries.remove(*key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        inner.prune(key);

        let entry = inner.entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: Stored::Set(HashSet::new()),
            deadline: None,
        });
        match &mut entry.value {
            Stored::Set(members) => Ok(members.insert(member.to_string())),
            Stored::Scalar(_) => Err(anyhow!("key {key} holds a scalar")),
        }
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        let mut inner = self.inner.lock().await;
        inner.prune(key);

        match inner.entries.get(key) {
            None => Ok(Vec::new()),
            Some(entry) => match &entry.value {
                Stored::Set(members) => Ok(members.iter().cloned().collect()),
                Stored::Scalar(_) => Err(anyhow!("key {key} holds a scalar")),
            },
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
