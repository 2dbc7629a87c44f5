//! Key-value store integration for shared profile codes
//!
//! Records live in a Redis-compatible REST store with a per-key expiry. The
//! store is optional: deployments without credentials get
//! [`StoreHandle::Unavailable`] and callers degrade instead of failing.

pub mod client;
pub mod mock;

pub use client::KvRestClient;
pub use mock::MockKvStore;

use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` with an expiry only if `key` is not already live.
    ///
    /// Returns `false` when another record already holds the key.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;
}

/// Store capability injected into the code book.
#[derive(Clone)]
pub enum StoreHandle {
    Available(Arc<dyn KvStore>),
    Unavailable,
}

impl StoreHandle {
    pub fn available(store: impl KvStore + 'static) -> Self {
        Self::Available(Arc::new(store))
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}
