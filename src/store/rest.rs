//! REST-speaking key-value store client.
//!
//! Talks to an Upstash-style HTTP endpoint that accepts a single command per
//! request as a JSON array (`["INCR", "key"]`) and answers with
//! `{"result": ...}` or `{"error": "..."}`.

use crate::store::KeyValueStore;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{Instrument, info_span};

#[derive(Clone, Debug)]
pub struct RestStore {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl RestStore {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, token: SecretString) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::api::APP_USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn command(&self, cmd: &[&str]) -> Result<Value> {
        let span = info_span!(
            "store.command",
            http.method = "POST",
            store.command = cmd.first().copied().unwrap_or_default()
        );
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(self.token.expose_secret())
            .json(&cmd)
            .send()
            .instrument(span)
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("store command failed: {status} {body}"));
        }

        let json: Value = response.json().await?;
        parse_result(json)
    }
}

/// Extract the `result` field, surfacing a store-side `error` field instead
/// when present.
fn parse_result(mut json: Value) -> Result<Value> {
    if let Some(error) = json.get("error").and_then(Value::as_str) {
        return Err(anyhow!("store error: {error}"));
    }

    json.get_mut("result")
        .map(Value::take)
        .context("store response missing result field")
}

fn as_int(value: &Value) -> Result<i64> {
    value
        .as_i64()
        .with_context(|| format!("expected integer store reply, got {value}"))
}

#[async_trait]
impl KeyValueStore for RestStore {
    async fn incr(&self, key: &str) -> Result<i64> {
        as_int(&self.command(&["INCR", key]).await?)
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<bool> {
        let reply = self.command(&["EXPIRE", key, &seconds.to_string()]).await?;
        Ok(as_int(&reply)? == 1)
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        as_int(&self.command(&["TTL", key]).await?)
    }

    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<()> {
        self.command(&["SETEX", key, &seconds.to_string(), value])
            .await?;
        Ok(())
    }

    async fn del(&self, keys: &[&str]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut cmd = vec!["DEL"];
        cmd.extend_from_slice(keys);
        let reply = self.command(&cmd).await?;
        u64::try_from(as_int(&reply)?).context("negative DEL reply")
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool> {
        let reply = self.command(&["SADD", key, member]).await?;
        Ok(as_int(&reply)? == 1)
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        let reply = self.command(&["SMEMBERS", key]).await?;
        let members = reply
            .as_array()
            .with_context(|| format!("expected array store reply, got {reply}"))?;

        members
            .iter()
            .map(|member| {
                member
                    .as_str()
                    .map(str::to_string)
                    .with_context(|| format!("expected string set member, got {member}"))
            })
            .collect()
    }

    async fn ping(&self) -> Result<()> {
        let reply = self.command(&["PING"]).await?;
        match reply.as_str() {
            Some("PONG") => Ok(()),
            _ => Err(anyhow!("unexpected PING reply: {reply}")),
        }
    }
}
