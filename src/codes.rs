//! Short shareable codes and the profile code book
//!
//! A code is six symbols from a 32-character alphabet without the easily
//! confused `0`, `O`, `1` and `I`. Each issued code maps to one stored
//! [`ProfileRecord`] until the store expires it.

use crate::models::ProfileRecord;
use crate::store::StoreHandle;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, error, info, warn};

pub const CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const CODE_LENGTH: usize = 6;
pub const CODE_TTL_DAYS: i64 = 30;
pub const MAX_CODE_ATTEMPTS: usize = 10;

const KEY_PREFIX: &str = "profile:";

/// A six-character, uppercase profile code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    /// Draws a fresh code uniformly from [`CODE_ALPHABET`].
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..CODE_LENGTH)
            .map(|_| *CODE_ALPHABET.choose(rng).unwrap_or(&b'A') as char)
            .collect();
        Self(code)
    }

    /// Accepts any input of exactly [`CODE_LENGTH`] characters, uppercased.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.chars().count() != CODE_LENGTH {
            return None;
        }
        Some(Self(raw.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn storage_key(&self) -> String {
        format!("{}{}", KEY_PREFIX, self.0)
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn fresh_code() -> ShortCode {
    ShortCode::generate(&mut rand::thread_rng())
}

/// Result of a save: the code is always usable for display, but only
/// retrievable when `persisted` is set.
#[derive(Debug, Clone)]
pub struct SavedCode {
    pub code: ShortCode,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub persisted: bool,
    pub warning: Option<String>,
}

/// Issues codes for profiles and resolves them back.
pub struct CodeBook {
    store: StoreHandle,
    ttl: chrono::Duration,
}

impl CodeBook {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            store,
            ttl: chrono::Duration::days(CODE_TTL_DAYS),
        }
    }

    pub fn store_available(&self) -> bool {
        self.store.is_available()
    }

    fn unsaved(&self, code: ShortCode, now: DateTime<Utc>, warning: &str) -> SavedCode {
        SavedCode {
            code,
            created_at: now,
            expires_at: now + self.ttl,
            persisted: false,
            warning: Some(warning.to_string()),
        }
    }

    /// Stores `profile` under a new code.
    ///
    /// Never fails: store problems degrade to an unsaved code with a warning.
    /// After [`MAX_CODE_ATTEMPTS`] collisions no record is written, so an
    /// existing code is never reassigned.
    pub async fn save(&self, profile: &Value) -> SavedCode {
        let now = Utc::now();

        let store = match &self.store {
            StoreHandle::Available(store) => store,
            StoreHandle::Unavailable => {
                let code = fresh_code();
                info!(
                    "Generated code {} (KV not configured - code won't be retrievable)",
                    code
                );
                return self.unsaved(
                    code,
                    now,
                    "Code generated but not saved - KV store not configured",
                );
            }
        };

        let ttl = match self.ttl.to_std() {
            Ok(ttl) => ttl,
            Err(e) => {
                error!("Invalid code TTL: {}", e);
                return self.unsaved(fresh_code(), now, "Code generated but not saved");
            }
        };

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = fresh_code();
            let key = code.storage_key();

            match store.get(&key).await {
                Ok(Some(_)) => {
                    debug!("Code {} already taken (attempt {})", code, attempt);
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("KV lookup failed while saving profile: {}", e);
                    return self.unsaved(
                        code,
                        now,
                        "Code generated but not saved - KV store unreachable",
                    );
                }
            }

            let record = ProfileRecord::new(code.clone(), profile.clone(), now, self.ttl);
            let payload = match serde_json::to_string(&record) {
                Ok(payload) => payload,
                Err(e) => {
                    error!("Failed to serialize profile record: {}", e);
                    return self.unsaved(code, now, "Code generated but not saved");
                }
            };

            match store.set_if_absent(&key, &payload, ttl).await {
                Ok(true) => {
                    info!("Profile saved with code: {} (KV enabled)", code);
                    return SavedCode {
                        code,
                        created_at: record.created_at,
                        expires_at: record.expires_at,
                        persisted: true,
                        warning: None,
                    };
                }
                Ok(false) => {
                    debug!("Code {} claimed concurrently (attempt {})", code, attempt);
                }
                Err(e) => {
                    warn!("KV write failed while saving profile: {}", e);
                    return self.unsaved(
                        code,
                        now,
                        "Code generated but not saved - KV store unreachable",
                    );
                }
            }
        }

        error!(
            "Failed to generate a unique code after {} attempts",
            MAX_CODE_ATTEMPTS
        );
        self.unsaved(
            fresh_code(),
            now,
            "Code generated but not saved - no free code found",
        )
    }

    /// Looks up the record for `code`.
    ///
    /// Missing, expired and unreachable all read as not found; a store that
    /// was never configured is reported as unavailable.
    pub async fn load(&self, code: &ShortCode) -> Result<ProfileRecord> {
        let store = match &self.store {
            StoreHandle::Available(store) => store,
            StoreHandle::Unavailable => {
                error!("KV store not configured, cannot resolve code {}", code);
                return Err(Error::StoreUnavailable);
            }
        };

        let raw = match store.get(&code.storage_key()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("Profile not found for code: {}", code);
                return Err(Error::NotFound("Profile not found or expired".to_string()));
            }
            Err(e) => {
                warn!("KV lookup failed for code {}: {}", code, e);
                return Err(Error::NotFound("Profile not found or expired".to_string()));
            }
        };

        let record: ProfileRecord = serde_json::from_str(&raw)?;
        info!("Profile retrieved for code: {}", code);
        Ok(record)
    }
}
