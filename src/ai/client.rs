use super::{MessagesRequest, MessagesService};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::new_with_client(api_key, client))
    }

    pub fn new_with_client(api_key: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl MessagesService for AnthropicClient {
    async fn create_message(&self, request: &MessagesRequest) -> Result<Value> {
        tracing::debug!(
            "Sending message request to Anthropic (model: {}, max_tokens: {}, image: {})",
            request.model,
            request.max_tokens,
            request.has_image()
        );

        let url = format!("{}/v1/messages", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Anthropic: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Anthropic API error (status {}): {}", status, error_text);
            let body = serde_json::from_str(&error_text).unwrap_or(Value::String(error_text));
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Anthropic response: {}\nBody: {}", e, body);
            Error::UpstreamFormat(format!("Failed to parse Anthropic response: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MessageContent;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(server: &MockServer) -> AnthropicClient {
        AnthropicClient::new("test-key".to_string(), Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri())
    }

    fn text_request() -> MessagesRequest {
        MessagesRequest::user("test-model", 100, MessageContent::Text("hi".to_string()))
    }

    #[tokio::test]
    async fn test_create_message_returns_envelope_unmodified() {
        let server = MockServer::start().await;
        let envelope = serde_json::json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [{ "type": "text", "text": "{\"ok\": true}" }],
            "stop_reason": "end_turn"
        });

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "max_tokens": 100
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let reply = make_client(&server)
            .create_message(&text_request())
            .await
            .unwrap();
        assert_eq!(reply, envelope);
    }

    #[tokio::test]
    async fn test_api_error_keeps_status_and_json_body() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "type": "error",
            "error": { "type": "rate_limit_error", "message": "slow down" }
        });

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(429).set_body_json(error_body.clone()))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .create_message(&text_request())
            .await
            .unwrap_err();
        match err {
            Error::Upstream { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, error_body);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_api_error_with_text_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .create_message(&text_request())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Upstream { status: 529, ref body } if body == "overloaded"
        ));
    }

    #[tokio::test]
    async fn test_non_json_success_is_format_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .create_message(&text_request())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UpstreamFormat(_)));
    }
}
