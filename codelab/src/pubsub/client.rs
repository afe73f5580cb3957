//! Async Pub/Sub client speaking the REST (v1) API.
//!
//! One client is built at startup and cloned into every handler. It holds no
//! mutable state, so clones can be used concurrently without coordination.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, info};
use url::Url;

use super::error::{ApiError, ClientError, PublishError, RequestError};
use super::types::{
    OutgoingMessage, PublishRequest, PublishResponse, PushConfig, SubscriptionRequest, WireMessage,
};
use crate::Config;

/// Connection settings for [`PubSubClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Base URL of the REST API, e.g. `http://localhost:8085`
    pub endpoint: String,
    pub project_id: String,
    /// Bearer token sent with every request when set
    pub access_token: Option<String>,
    /// Per-request timeout; no timeout when `None`
    pub timeout: Option<Duration>,
}

impl ClientSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.pubsub_endpoint.clone(),
            project_id: config.project_id.clone(),
            access_token: config.access_token.clone(),
            timeout: config.request_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Shared handle to the Pub/Sub service.
#[derive(Clone)]
pub struct PubSubClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: Client,
    endpoint: String,
    project_id: String,
    access_token: Option<String>,
}

impl PubSubClient {
    /// Create a client. No request is made until the first call.
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let endpoint = Url::parse(&settings.endpoint).map_err(|source| {
            ClientError::InvalidEndpoint {
                endpoint: settings.endpoint.clone(),
                source,
            }
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                endpoint: endpoint.as_str().trim_end_matches('/').to_string(),
                project_id: settings.project_id,
                access_token: settings.access_token,
            }),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.inner.project_id
    }

    /// Fully qualified topic name: `projects/{project}/topics/{name}`.
    pub fn topic_path(&self, name: &str) -> String {
        format!("projects/{}/topics/{}", self.inner.project_id, name)
    }

    /// Fully qualified subscription name: `projects/{project}/subscriptions/{name}`.
    pub fn subscription_path(&self, name: &str) -> String {
        format!("projects/{}/subscriptions/{}", self.inner.project_id, name)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.inner.endpoint, path)
    }

    /// Send a request and turn non-success statuses into [`ApiError`].
    async fn send(&self, request: RequestBuilder) -> Result<Response, RequestError> {
        let request = match &self.inner.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_response(status, &body).into())
    }

    /// Create a topic.
    pub async fn create_topic(&self, name: &str) -> Result<(), RequestError> {
        let path = self.topic_path(name);
        self.send(
            self.inner
                .http
                .put(self.url(&path))
                .json(&serde_json::json!({})),
        )
        .await?;

        info!(topic = %path, "pubsub_topic_created");
        Ok(())
    }

    /// Create a subscription on `topic` that pushes to `push_endpoint`.
    pub async fn create_push_subscription(
        &self,
        name: &str,
        topic: &str,
        push_endpoint: &str,
    ) -> Result<(), RequestError> {
        let path = self.subscription_path(name);
        let body = SubscriptionRequest {
            topic: self.topic_path(topic),
            push_config: Some(PushConfig {
                push_endpoint: push_endpoint.to_string(),
            }),
        };

        self.send(self.inner.http.put(self.url(&path)).json(&body))
            .await?;

        info!(
            subscription = %path,
            topic = %body.topic,
            push_endpoint = %push_endpoint,
            "pubsub_subscription_created"
        );
        Ok(())
    }

    /// Publish one message and wait for the service to assign its id.
    pub async fn publish(
        &self,
        topic: &str,
        message: &OutgoingMessage,
    ) -> Result<String, PublishError> {
        let path = self.topic_path(topic);
        let body = PublishRequest {
            messages: vec![WireMessage::from(message)],
        };

        let response = self
            .send(
                self.inner
                    .http
                    .post(format!("{}:publish", self.url(&path)))
                    .json(&body),
            )
            .await?;

        let published: PublishResponse = response.json().await?;
        let message_id = published
            .message_ids
            .into_iter()
            .next()
            .ok_or(PublishError::EmptyResponse)?;

        debug!(
            topic = %path,
            message_id = %message_id,
            body_length = message.data.len(),
            "pubsub_message_published"
        );

        Ok(message_id)
    }
}
