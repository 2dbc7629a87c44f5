use super::KvStore;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// In-memory store with expiry, used by tests and local harnesses.
#[derive(Clone, Default)]
pub struct MockKvStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    failing: Arc<Mutex<bool>>,
    get_count: Arc<Mutex<usize>>,
    set_count: Arc<Mutex<usize>>,
}

impl MockKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: String, value: String, expires_at: DateTime<Utc>) -> Self {
        self.entries
            .lock()
            .unwrap()
            .insert(key, Entry { value, expires_at });
        self
    }

    /// Makes every subsequent call fail with a store error.
    pub fn failing(self) -> Self {
        *self.failing.lock().unwrap() = true;
        self
    }

    pub fn get_get_count(&self) -> usize {
        *self.get_count.lock().unwrap()
    }

    pub fn get_set_count(&self) -> usize {
        *self.set_count.lock().unwrap()
    }

    /// Live (non-expired) keys currently held.
    pub fn keys(&self) -> Vec<String> {
        let now = Utc::now();
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, entry)| entry.expires_at > now)
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn check_failing(&self) -> Result<()> {
        if *self.failing.lock().unwrap() {
            return Err(Error::Store("mock store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KvStore for MockKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        *self.get_count.lock().unwrap() += 1;
        self.check_failing()?;

        let now = Utc::now();
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone()))
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        *self.set_count.lock().unwrap() += 1;
        self.check_failing()?;

        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| Error::Store(format!("Invalid TTL: {}", e)))?;

        let mut entries = self.entries.lock().unwrap();
        if entries.get(key).is_some_and(|entry| entry.expires_at > now) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }
}
