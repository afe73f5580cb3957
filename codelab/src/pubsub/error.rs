//! Error types for Pub/Sub operations.
//!
//! Decode and publish errors are local to a request. Provisioning errors are
//! returned from startup and the entry point treats them as fatal. Nothing
//! here is retried.

use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// The inbound push body could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Body is not a JSON push envelope.
    #[error("malformed push envelope: {0}")]
    Json(#[from] serde_json::Error),

    /// `message.data` is not valid base64.
    #[error("message data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Error response returned by the Pub/Sub service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code of the response
    pub status_code: u16,
    /// Canonical status name, e.g. `ALREADY_EXISTS` or `NOT_FOUND`
    pub status: Option<String>,
    /// Human readable message from the service (or the raw body)
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl ApiError {
    /// Build from an HTTP status and response body.
    ///
    /// Google APIs wrap failures as `{"error": {"code", "message", "status"}}`;
    /// any other body is kept verbatim as the message.
    pub fn from_response(status_code: StatusCode, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => Self {
                status_code: status_code.as_u16(),
                status: parsed.error.status,
                message: parsed.error.message,
            },
            Err(_) => Self {
                status_code: status_code.as_u16(),
                status: None,
                message: body.trim().to_string(),
            },
        }
    }

    /// True when the resource being created is already there.
    pub fn is_already_exists(&self) -> bool {
        self.status_code == StatusCode::CONFLICT.as_u16()
            || self.status.as_deref() == Some("ALREADY_EXISTS")
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Some(status) => write!(f, "{} (HTTP {}): {}", status, self.status_code, self.message),
            None => write!(f, "HTTP {}: {}", self.status_code, self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// A request to the service failed before or after reaching it.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Network or protocol failure.
    #[error("pubsub request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Service answered with an error status.
    #[error("pubsub returned an error: {0}")]
    Api(#[from] ApiError),
}

impl RequestError {
    /// True when the service reported the resource as already existing.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, RequestError::Api(e) if e.is_already_exists())
    }
}

/// Publishing a message failed.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Request could not be completed.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Service acknowledged the publish without assigning an id.
    #[error("pubsub publish response carried no message id")]
    EmptyResponse,

    /// Payload could not be serialized.
    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<reqwest::Error> for PublishError {
    fn from(e: reqwest::Error) -> Self {
        PublishError::Request(RequestError::Transport(e))
    }
}

impl From<ApiError> for PublishError {
    fn from(e: ApiError) -> Self {
        PublishError::Request(RequestError::Api(e))
    }
}

/// Creating the topic or a subscription failed for a reason other than
/// "already exists".
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("failed to create topic {name}: {source}")]
    Topic {
        name: String,
        #[source]
        source: RequestError,
    },

    #[error("failed to create subscription {name}: {source}")]
    Subscription {
        name: String,
        #[source]
        source: RequestError,
    },
}

/// The client could not be constructed.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid pubsub endpoint {endpoint}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_from_google_body() {
        let body = r#"{"error":{"code":409,"message":"Topic already exists","status":"ALREADY_EXISTS"}}"#;
        let err = ApiError::from_response(StatusCode::CONFLICT, body);

        assert_eq!(err.status_code, 409);
        assert_eq!(err.status.as_deref(), Some("ALREADY_EXISTS"));
        assert_eq!(err.message, "Topic already exists");
        assert!(err.is_already_exists());
        assert_eq!(err.to_string(), "ALREADY_EXISTS (HTTP 409): Topic already exists");
    }

    #[test]
    fn test_api_error_from_plain_body() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, "Not found\n");

        assert_eq!(err.status, None);
        assert_eq!(err.message, "Not found");
        assert!(!err.is_already_exists());
        assert_eq!(err.to_string(), "HTTP 404: Not found");
    }

    #[test]
    fn test_already_exists_by_status_name() {
        let err = ApiError {
            status_code: 400,
            status: Some("ALREADY_EXISTS".to_string()),
            message: String::new(),
        };
        assert!(err.is_already_exists());
        assert!(RequestError::Api(err).is_already_exists());
    }
}
