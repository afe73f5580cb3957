//! Pub/Sub REST (v1) request and response bodies.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// Payload published by the `/submit` endpoint: the JSON string "Hello World".
pub const DEMO_PAYLOAD: &str = "Hello World";

/// Message to publish.
#[derive(Debug, Clone, Default)]
pub struct OutgoingMessage {
    pub data: Vec<u8>,
    pub attributes: HashMap<String, String>,
}

impl OutgoingMessage {
    /// Create a message from raw payload bytes.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            attributes: HashMap::new(),
        }
    }

    /// Create a message whose payload is `value` serialized as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::to_vec(value)?))
    }

    /// Attach an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Body of `POST /v1/projects/{p}/topics/{t}:publish`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublishRequest {
    pub messages: Vec<WireMessage>,
}

/// A message as it travels in JSON, with base64 data.
#[derive(Debug, Serialize, Deserialize)]
pub struct WireMessage {
    pub data: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
}

impl From<&OutgoingMessage> for WireMessage {
    fn from(message: &OutgoingMessage) -> Self {
        Self {
            data: STANDARD.encode(&message.data),
            attributes: message.attributes.clone(),
        }
    }
}

/// Response of a publish call.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    #[serde(default)]
    pub message_ids: Vec<String>,
}

/// Body of `PUT /v1/projects/{p}/subscriptions/{s}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    /// Fully qualified topic path
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_config: Option<PushConfig>,
}

/// Push delivery target of a subscription.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushConfig {
    pub push_endpoint: String,
}
