use super::KvStore;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Client for Redis-over-REST stores (Upstash / Vercel KV).
///
/// Each call posts one command as a JSON array to the base URL and reads back
/// `{"result": ...}` or `{"error": "..."}`.
pub struct KvRestClient {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct CommandReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl KvRestClient {
    pub fn new(base_url: String, token: String) -> Self {
        Self::new_with_client(base_url, token, Client::new())
    }

    pub fn new_with_client(base_url: String, token: String, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    async fn command(&self, args: &[&str]) -> Result<Option<Value>> {
        tracing::debug!("Sending {} command to KV store", args.first().unwrap_or(&""));

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to KV store: {}", e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;
        let reply: CommandReply = serde_json::from_str(&body).map_err(|e| {
            Error::Store(format!(
                "Unexpected KV reply (status {}): {} ({})",
                status, body, e
            ))
        })?;

        if let Some(message) = reply.error {
            return Err(Error::Store(message));
        }
        if !status.is_success() {
            return Err(Error::Store(format!("KV store returned status {}", status)));
        }

        Ok(reply.result.filter(|v| !v.is_null()))
    }
}

#[async_trait]
impl KvStore for KvRestClient {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.command(&["GET", key]).await?.map(|value| match value {
            Value::String(s) => s,
            other => other.to_string(),
        }))
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let seconds = ttl.as_secs().to_string();
        let reply = self
            .command(&["SET", key, value, "EX", &seconds, "NX"])
            .await?;
        Ok(reply.is_some())
    }
}
