use crate::Error;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            // 4xx
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,

            // relayed
            Error::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Error::UpstreamFormat(_) => StatusCode::BAD_GATEWAY,
            Error::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            // 5xx
            Error::Io(_)
            | Error::Serialization(_)
            | Error::Http(_)
            | Error::Store(_)
            | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            Error::BadRequest(message) | Error::NotFound(message) => json!({ "error": message }),
            Error::MethodNotAllowed => json!({ "error": "Method not allowed" }),
            Error::Upstream { body, .. } => json!({
                "error": "Error calling model API",
                "details": body,
            }),
            Error::UpstreamFormat(message) => json!({
                "error": "Unreadable model response",
                "message": message,
            }),
            Error::StoreUnavailable => json!({
                "error": "Service not available",
                "message": "KV store not configured - codes cannot be retrieved. Please use screenshots instead.",
            }),
            other => json!({
                "error": "Internal server error",
                "message": other.to_string(),
            }),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", status, self);
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(err: JsonRejection) -> Self {
        Error::BadRequest(err.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(err: QueryRejection) -> Self {
        Error::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn render(err: Error) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_client_errors_carry_short_message() {
        let (status, body) = render(Error::BadRequest("No image data provided".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No image data provided" }));

        let (status, body) = render(Error::NotFound("Profile not found or expired".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Profile not found or expired" }));

        let (status, body) = render(Error::MethodNotAllowed).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({ "error": "Method not allowed" }));
    }

    #[tokio::test]
    async fn test_upstream_error_relays_status_and_details() {
        let upstream = json!({ "type": "error", "error": { "type": "overloaded_error" } });
        let (status, body) = render(Error::Upstream {
            status: 529,
            body: upstream.clone(),
        })
        .await;

        assert_eq!(status.as_u16(), 529);
        assert_eq!(body["details"], upstream);
    }

    #[tokio::test]
    async fn test_store_unavailable_is_503() {
        let (status, body) = render(Error::StoreUnavailable).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Service not available");
    }

    #[tokio::test]
    async fn test_unexpected_errors_expose_message() {
        let (status, body) = render(Error::Store("connection reset".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert!(body["message"].as_str().unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_format_error_is_bad_gateway() {
        let (status, body) = render(Error::UpstreamFormat("not json".into())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Unreadable model response");
    }
}
