//! Push-delivery envelope decoding.
//!
//! When a push subscription delivers a message it POSTs a JSON envelope:
//!
//! ```text
//! {
//!   "subscription": "push1",
//!   "message": { "data": "SGVsbG8gV29ybGQ=", "attributes": {...} },
//!   "messageID": "42"
//! }
//! ```
//!
//! `message.data` is base64 on the wire. Decoding hands back the raw payload
//! bytes and nothing else: no acknowledgement, no retry, no logging.

use std::collections::HashMap;
use std::io::Read;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;

use super::error::DecodeError;

/// Envelope wrapping a single push delivery.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushEnvelope {
    /// Subscription that triggered the delivery
    #[serde(default)]
    pub subscription: String,

    /// Delivered message, absent when the service sent no body
    #[serde(default)]
    pub message: Option<PushMessage>,

    /// Delivery id assigned by the service
    #[serde(default, rename = "messageID")]
    pub message_id: Option<String>,
}

/// Message carried inside a [`PushEnvelope`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushMessage {
    /// Base64-encoded payload
    #[serde(default)]
    pub data: Option<String>,

    #[serde(default)]
    pub attributes: Option<HashMap<String, String>>,

    #[serde(default, rename = "messageId", alias = "message_id")]
    pub message_id: Option<String>,

    #[serde(default, rename = "publishTime", alias = "publish_time")]
    pub publish_time: Option<String>,
}

impl PushEnvelope {
    /// Parse an envelope from a byte stream.
    ///
    /// Only the first JSON value is read; anything after it is ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DecodeError> {
        let mut de = serde_json::Deserializer::from_reader(reader);
        Ok(Self::deserialize(&mut de)?)
    }

    /// Parse an envelope from a buffered body, reading the first JSON value.
    pub fn from_slice(body: &[u8]) -> Result<Self, DecodeError> {
        let mut de = serde_json::Deserializer::from_slice(body);
        Ok(Self::deserialize(&mut de)?)
    }

    /// Parse a request body. An empty body yields an envelope with no message.
    pub fn from_body(body: &[u8]) -> Result<Self, DecodeError> {
        if body.is_empty() {
            return Ok(Self::default());
        }
        Self::from_slice(body)
    }

    /// Delivery id, preferring the envelope-level field.
    pub fn message_id(&self) -> Option<&str> {
        self.message_id
            .as_deref()
            .or_else(|| self.message.as_ref().and_then(|m| m.message_id.as_deref()))
    }

    /// Raw payload bytes, or `None` when the delivery carried no data.
    pub fn payload(&self) -> Result<Option<Vec<u8>>, DecodeError> {
        let data = match self.message.as_ref().and_then(|m| m.data.as_deref()) {
            Some(data) if !data.is_empty() => data,
            _ => return Ok(None),
        };

        Ok(Some(STANDARD.decode(data)?))
    }
}

/// Decode the payload of a push delivery read from `body`.
///
/// A missing body is not an error and yields `Ok(None)`, as does an envelope
/// without message data.
pub fn decode_push_message<R: Read>(body: Option<R>) -> Result<Option<Vec<u8>>, DecodeError> {
    match body {
        Some(reader) => PushEnvelope::from_reader(reader)?.payload(),
        None => Ok(None),
    }
}

/// Decode a buffered request body. An empty body counts as no body.
pub fn decode_push_body(body: &[u8]) -> Result<Option<Vec<u8>>, DecodeError> {
    PushEnvelope::from_body(body)?.payload()
}
