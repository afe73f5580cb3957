//! Endpoint handlers.
//!
//! None of these hold queueing logic of their own: publishing goes through
//! the shared [`PubSubClient`] and delivery guarantees belong to the service.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info, warn};

use crate::pubsub::{
    DecodeError, OutgoingMessage, PubSubClient, PublishError, PushEnvelope, DEMO_PAYLOAD,
};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: PubSubClient,
}

impl AppState {
    pub fn new(config: Config, client: PubSubClient) -> Self {
        Self {
            config: Arc::new(config),
            client,
        }
    }
}

/// Welcome page.
pub async fn home(State(state): State<AppState>) -> String {
    format!("Welcome at {}", state.config.instance_name)
}

/// Publish the demo payload to the configured topic.
///
/// Responds with the assigned message id, or 500 with the error text.
pub async fn submit(State(state): State<AppState>) -> impl IntoResponse {
    match publish_demo_message(&state).await {
        Ok(message_id) => {
            info!(
                topic = %state.config.topic,
                message_id = %message_id,
                "message_published"
            );
            (
                StatusCode::OK,
                format!("Message published, ID: {}", message_id),
            )
        }
        Err(e) => {
            error!(topic = %state.config.topic, error = %e, "publish_failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn publish_demo_message(state: &AppState) -> Result<String, PublishError> {
    let message = OutgoingMessage::json(DEMO_PAYLOAD)?;
    state.client.publish(&state.config.topic, &message).await
}

/// Receive a push delivery.
///
/// Always answers 200 with an empty body; a body that does not decode is
/// logged and dropped.
pub async fn push(body: Bytes) -> StatusCode {
    match decode_delivery(&body) {
        Ok((envelope, payload)) => {
            let payload = payload.unwrap_or_default();
            info!(
                subscription = %envelope.subscription,
                message_id = envelope.message_id().unwrap_or_default(),
                payload = %String::from_utf8_lossy(&payload),
                payload_length = payload.len(),
                "decoded_message"
            );
        }
        Err(e) => {
            warn!(
                error = %e,
                body_preview = %String::from_utf8_lossy(&body[..body.len().min(500)]),
                "push_decode_failed"
            );
        }
    }

    StatusCode::OK
}

fn decode_delivery(body: &[u8]) -> Result<(PushEnvelope, Option<Vec<u8>>), DecodeError> {
    let envelope = PushEnvelope::from_body(body)?;
    let payload = envelope.payload()?;
    Ok((envelope, payload))
}
