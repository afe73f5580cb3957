//! Codelab web server.
//!
//! Startup:
//! 1. Load configuration from the environment
//! 2. Build the shared Pub/Sub client
//! 3. Create the topic and push subscriptions if they are missing
//! 4. Serve `/`, `/submit` and `/push` until SIGINT/SIGTERM
//!
//! A provisioning failure aborts startup.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use codelab::web::{router, shutdown_signal};
use codelab::{provision, AppState, ClientSettings, Config, PubSubClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        project_id = %config.project_id,
        pubsub_endpoint = %config.pubsub_endpoint,
        access_token_set = config.access_token.is_some(),
        topic = %config.topic,
        subscriptions = ?config.subscriptions,
        push_url = ?config.push_url.as_ref().map(|u| u.as_str()),
        "config_loaded"
    );

    // Create the shared Pub/Sub client
    let client = PubSubClient::new(ClientSettings::from_config(&config))
        .context("Failed to create Pub/Sub client")?;
    info!("pubsub_client_created");

    provision(&client, &config)
        .await
        .context("Failed to provision Pub/Sub resources")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(AppState::new(config, client));

    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

    Ok(())
}
