//! Pub/Sub codelab - publish and push-delivery walkthrough service.
//!
//! ## Architecture
//!
//! ```text
//! GET /submit → PubSubClient → Pub/Sub topic "jobs" → push subscription(s) → POST /push → log
//! ```
//!
//! The topic and push subscriptions are created at startup if missing.

pub mod config;
pub mod pubsub;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use pubsub::{
    decode_push_message, provision, ClientSettings, DecodeError, ProvisioningError, PubSubClient,
    PublishError, PushEnvelope,
};
pub use web::AppState;
