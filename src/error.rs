//! Error handling and custom error types
//!
//! Provides unified error handling across the service using thiserror. The
//! HTTP layer maps each variant onto a status code in `api::error`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success reply from the model API, relayed with its own status.
    #[error("Model API error (status {status})")]
    Upstream {
        status: u16,
        body: serde_json::Value,
    },

    /// The model replied, but its text could not be read as the expected JSON.
    #[error("Unreadable model response: {0}")]
    UpstreamFormat(String),

    #[error("KV store error: {0}")]
    Store(String),

    #[error("KV store not configured")]
    StoreUnavailable,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
