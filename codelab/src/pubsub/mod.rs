//! Pub/Sub module.
//!
//! This module provides:
//! - Push envelope decoding for inbound deliveries
//! - A REST client for publishing and resource management
//! - Idempotent startup provisioning
//!
//! ## Flow
//!
//! ```text
//! /submit → PubSubClient::publish → topic → push subscription → /push → decode_push_body
//! ```

pub mod client;
pub mod envelope;
pub mod error;
pub mod provision;
pub mod types;

pub use client::{ClientSettings, PubSubClient};
pub use envelope::{decode_push_body, decode_push_message, PushEnvelope, PushMessage};
pub use error::{ApiError, ClientError, DecodeError, ProvisioningError, PublishError, RequestError};
pub use provision::{create_push_subscription_if_not_exists, create_topic_if_not_exists, provision};
pub use types::{OutgoingMessage, DEMO_PAYLOAD};
