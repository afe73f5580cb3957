//! Web server module.
//!
//! Three endpoints:
//! - `GET /`: welcome page
//! - `GET /submit`: publish a demo message
//! - `POST /push`: receive push deliveries and log their payload

pub mod handlers;
pub mod server;

pub use handlers::{home, push, submit, AppState};
pub use server::{router, shutdown_signal, MAX_BODY_BYTES};
