//! Data models and structures
//!
//! Defines stored profile records, the movie facts read off a screenshot,
//! request descriptors, and the service configuration.

use crate::codes::ShortCode;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// RFC 3339 timestamps with millisecond precision (`2025-01-01T00:00:00.000Z`).
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// One stored profile, as written to the KV store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub code: ShortCode,
    pub profile: Value,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub expires_at: DateTime<Utc>,
}

impl ProfileRecord {
    pub fn new(
        code: ShortCode,
        profile: Value,
        created_at: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            code,
            profile,
            created_at,
            expires_at: created_at + ttl,
        }
    }
}

/// Loose readers for model-written fields: any scalar is kept as its text,
/// `null` entries are dropped and a `null` list reads as empty.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn text(value: Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    pub fn list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items.into_iter().filter_map(text).collect(),
            single => text(single).into_iter().collect(),
        })
    }

    pub fn scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(text(Value::deserialize(deserializer)?))
    }

    pub fn ratings<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<super::MovieRatings>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Object(map) => super::MovieRatings::deserialize(Value::Object(map))
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

/// Movie facts the extraction model reads off a Letterboxd screenshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedMovieInfo {
    #[serde(default, deserialize_with = "lenient::list")]
    pub favorites: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub recent: Vec<String>,
    #[serde(default, deserialize_with = "lenient::ratings")]
    pub ratings: Option<MovieRatings>,
    #[serde(default, deserialize_with = "lenient::scalar")]
    pub stats: Option<String>,
}

/// Ratings parallel to [`ParsedMovieInfo::favorites`] and `recent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieRatings {
    #[serde(default, deserialize_with = "lenient::list")]
    pub favorites: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub recent: Vec<String>,
}

impl ParsedMovieInfo {
    pub const MAX_TITLES: usize = 4;

    /// Caps every list at [`Self::MAX_TITLES`] entries.
    pub fn clamped(mut self) -> Self {
        self.favorites.truncate(Self::MAX_TITLES);
        self.recent.truncate(Self::MAX_TITLES);
        if let Some(ratings) = self.ratings.as_mut() {
            ratings.favorites.truncate(Self::MAX_TITLES);
            ratings.recent.truncate(Self::MAX_TITLES);
        }
        self
    }

    pub fn favorite_ratings(&self) -> &[String] {
        self.ratings
            .as_ref()
            .map(|r| r.favorites.as_slice())
            .unwrap_or_default()
    }

    pub fn recent_ratings(&self) -> &[String] {
        self.ratings
            .as_ref()
            .map(|r| r.recent.as_slice())
            .unwrap_or_default()
    }
}

/// Where one side of a compatibility request gets its profile from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ProfileSource {
    Code(String),
    Screenshot(String),
}

/// The two sides of a compatibility request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    User,
    Crush,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::User => f.write_str("User"),
            Party::Crush => f.write_str("Crush"),
        }
    }
}

/// Deployment stage; only non-production stages serve canned responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStage {
    Production,
    Preview,
    Development,
}

impl DeploymentStage {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "preview" => DeploymentStage::Preview,
            "development" | "dev" | "local" => DeploymentStage::Development,
            _ => DeploymentStage::Production,
        }
    }

    pub fn allows_mock_responses(self) -> bool {
        !matches!(self, DeploymentStage::Production)
    }
}

/// Model ids used for the two relay steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    pub extraction_model: String,
    pub profile_model: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            extraction_model: "claude-3-5-haiku-20241022".to_string(),
            profile_model: "claude-sonnet-4-20250514".to_string(),
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub anthropic_base_url: String,
    pub stage: DeploymentStage,
    pub kv_rest_url: Option<String>,
    pub kv_rest_token: Option<String>,
    pub models: ModelSettings,
    pub bind_address: String,
    pub upstream_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = ModelSettings::default();

        let upstream_timeout = match var("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse().map_err(|_| {
                Error::Config(format!("UPSTREAM_TIMEOUT_SECS is not a number: {}", raw))
            })?),
            None => Duration::from_secs(120),
        };

        Ok(Self {
            anthropic_api_key: var("ANTHROPIC_API_KEY")
                .ok_or_else(|| Error::Config("ANTHROPIC_API_KEY not set".to_string()))?,
            anthropic_base_url: var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| "https://api.anthropic.com".to_string()),
            stage: var("APP_ENV")
                .or_else(|| var("VERCEL_ENV"))
                .map(|v| DeploymentStage::parse(&v))
                .unwrap_or(DeploymentStage::Production),
            kv_rest_url: var("KV_REST_API_URL"),
            kv_rest_token: var("KV_REST_API_TOKEN"),
            models: ModelSettings {
                extraction_model: var("EXTRACTION_MODEL").unwrap_or(defaults.extraction_model),
                profile_model: var("PROFILE_MODEL").unwrap_or(defaults.profile_model),
            },
            bind_address: var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            upstream_timeout,
        })
    }

    /// Both KV credentials, when configured.
    pub fn kv_credentials(&self) -> Option<(&str, &str)> {
        match (&self.kv_rest_url, &self.kv_rest_token) {
            (Some(url), Some(token)) => Some((url.as_str(), token.as_str())),
            _ => None,
        }
    }
}
