use super::reply::text_envelope;
use super::{MessagesRequest, MessagesService};
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
enum MockReply {
    Envelope(Value),
    Failure { status: u16, body: Value },
}

/// Scripted relay client: replies are served in order, cycling when the
/// script runs out, and every request is recorded.
#[derive(Clone, Default)]
pub struct MockMessagesClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    requests: Arc<Mutex<Vec<MessagesRequest>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockMessagesClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an envelope whose single text block is `text`.
    pub fn with_text_response(self, text: impl Into<String>) -> Self {
        self.with_envelope(text_envelope(text.into()))
    }

    pub fn with_envelope(self, envelope: Value) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::Envelope(envelope));
        self
    }

    /// Queues an upstream failure with the given status and body.
    pub fn with_error_response(self, status: u16, body: Value) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::Failure { status, body });
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn requests(&self) -> Vec<MessagesRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagesService for MockMessagesClient {
    async fn create_message(&self, request: &MessagesRequest) -> Result<Value> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        self.requests.lock().unwrap().push(request.clone());

        let replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Ok(text_envelope("{}".to_string()));
        }

        let index = (*count - 1) % replies.len();
        match &replies[index] {
            MockReply::Envelope(envelope) => Ok(envelope.clone()),
            MockReply::Failure { status, body } => Err(Error::Upstream {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::reply::envelope_text;
    use crate::ai::MessageContent;

    fn request(text: &str) -> MessagesRequest {
        MessagesRequest::user("m", 10, MessageContent::Text(text.to_string()))
    }

    #[tokio::test]
    async fn test_mock_default_reply_is_empty_object() {
        let client = MockMessagesClient::new();
        let reply = client.create_message(&request("x")).await.unwrap();
        assert_eq!(envelope_text(&reply), Some("{}"));
    }

    #[tokio::test]
    async fn test_mock_replies_in_order_and_cycles() {
        let client = MockMessagesClient::new()
            .with_text_response("one")
            .with_text_response("two");

        let first = client.create_message(&request("a")).await.unwrap();
        let second = client.create_message(&request("b")).await.unwrap();
        let third = client.create_message(&request("c")).await.unwrap();

        assert_eq!(envelope_text(&first), Some("one"));
        assert_eq!(envelope_text(&second), Some("two"));
        assert_eq!(envelope_text(&third), Some("one"));
        assert_eq!(client.get_call_count(), 3);

        let prompts: Vec<String> = client
            .requests()
            .iter()
            .filter_map(|r| r.prompt_text().map(str::to_string))
            .collect();
        assert_eq!(prompts, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_mock_error_response() {
        let client =
            MockMessagesClient::new().with_error_response(401, serde_json::json!({ "e": 1 }));

        let err = client.create_message(&request("x")).await.unwrap_err();
        assert!(matches!(err, Error::Upstream { status: 401, .. }));
    }
}
