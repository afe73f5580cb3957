//! Startup provisioning of the topic and its push subscriptions.
//!
//! Every step is "create if not exists": an already existing resource counts
//! as success, anything else is returned to the caller.

use tracing::{info, warn};

use super::client::PubSubClient;
use super::error::ProvisioningError;
use crate::Config;

/// Create the topic unless it already exists.
pub async fn create_topic_if_not_exists(
    client: &PubSubClient,
    name: &str,
) -> Result<(), ProvisioningError> {
    match client.create_topic(name).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_already_exists() => {
            info!(topic = %name, "pubsub_topic_exists");
            Ok(())
        }
        Err(source) => Err(ProvisioningError::Topic {
            name: name.to_string(),
            source,
        }),
    }
}

/// Create a push subscription on `topic` unless it already exists.
pub async fn create_push_subscription_if_not_exists(
    client: &PubSubClient,
    topic: &str,
    name: &str,
    push_endpoint: &str,
) -> Result<(), ProvisioningError> {
    match client
        .create_push_subscription(name, topic, push_endpoint)
        .await
    {
        Ok(()) => Ok(()),
        Err(e) if e.is_already_exists() => {
            info!(subscription = %name, "pubsub_subscription_exists");
            Ok(())
        }
        Err(source) => Err(ProvisioningError::Subscription {
            name: name.to_string(),
            source,
        }),
    }
}

/// Provision the configured topic and push subscriptions.
///
/// Subscriptions are skipped when no push URL is configured.
pub async fn provision(client: &PubSubClient, config: &Config) -> Result<(), ProvisioningError> {
    create_topic_if_not_exists(client, &config.topic).await?;

    let Some(push_url) = &config.push_url else {
        warn!(
            topic = %config.topic,
            subscriptions = ?config.subscriptions,
            "push_url_not_configured"
        );
        return Ok(());
    };

    for name in &config.subscriptions {
        create_push_subscription_if_not_exists(client, &config.topic, name, push_url.as_str())
            .await?;
    }

    info!(
        topic = %config.topic,
        subscriptions = config.subscriptions.len(),
        push_url = %push_url,
        "pubsub_provisioned"
    );

    Ok(())
}
