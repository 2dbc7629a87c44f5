//! Model relay integration
//!
//! Provides the interface to Anthropic's Messages API used for reading
//! Letterboxd screenshots and writing dating / compatibility profiles.

pub mod client;
pub mod mime;
pub mod mock;
pub mod reply;
pub mod types;

pub use client::AnthropicClient;
pub use mime::ScreenshotImage;
pub use mock::MockMessagesClient;
pub use types::{ContentBlock, ImageSource, MessageContent, MessagesRequest};

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait MessagesService: Send + Sync {
    /// Sends one relay call and returns the reply envelope as received.
    ///
    /// Non-success statuses surface as [`crate::Error::Upstream`].
    async fn create_message(&self, request: &MessagesRequest) -> Result<Value>;
}
