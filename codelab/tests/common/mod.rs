//! In-process fake of the Pub/Sub REST API used by the integration tests.
//!
//! It implements just enough of v1 to exercise the client: topic creation,
//! push subscription creation, and publish, with the same error shapes the
//! service returns.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::put,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use codelab::{ClientSettings, Config, PubSubClient};

#[derive(Default)]
struct FakeState {
    topics: HashSet<String>,
    subscriptions: HashMap<String, Value>,
    published: Vec<(String, Value)>,
    authorization: Vec<Option<String>>,
    next_id: u64,
    failure: Option<(StatusCode, String)>,
}

/// A running fake Pub/Sub server bound to an ephemeral port.
pub struct FakePubSub {
    pub addr: SocketAddr,
    state: Arc<Mutex<FakeState>>,
}

impl FakePubSub {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(FakeState::default()));

        let app = Router::new()
            .route(
                "/v1/projects/:project/topics/:topic",
                put(create_topic).post(publish),
            )
            .route(
                "/v1/projects/:project/subscriptions/:subscription",
                put(create_subscription),
            )
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake pubsub");
        let addr = listener.local_addr().expect("no local address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake pubsub crashed");
        });

        Self { addr, state }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> PubSubClient {
        self.client_with_token(None)
    }

    pub fn client_with_token(&self, access_token: Option<&str>) -> PubSubClient {
        PubSubClient::new(ClientSettings {
            endpoint: self.endpoint(),
            project_id: "test-project".to_string(),
            access_token: access_token.map(str::to_string),
            timeout: None,
        })
        .expect("failed to build client")
    }

    /// Make every subsequent request fail with `status` and a Google-style body.
    pub fn fail_with(&self, status: StatusCode, canonical: &str) {
        self.state.lock().unwrap().failure = Some((status, canonical.to_string()));
    }

    pub fn add_topic(&self, path: &str) {
        self.state.lock().unwrap().topics.insert(path.to_string());
    }

    pub fn topics(&self) -> HashSet<String> {
        self.state.lock().unwrap().topics.clone()
    }

    pub fn subscription(&self, path: &str) -> Option<Value> {
        self.state.lock().unwrap().subscriptions.get(path).cloned()
    }

    pub fn subscription_count(&self) -> usize {
        self.state.lock().unwrap().subscriptions.len()
    }

    pub fn published(&self) -> Vec<(String, Value)> {
        self.state.lock().unwrap().published.clone()
    }

    pub fn authorization(&self) -> Vec<Option<String>> {
        self.state.lock().unwrap().authorization.clone()
    }
}

/// Configuration pointing at a fake server.
pub fn test_config(endpoint: String) -> Config {
    Config {
        project_id: "test-project".to_string(),
        pubsub_endpoint: endpoint,
        access_token: None,
        topic: "jobs".to_string(),
        subscriptions: vec!["push1".to_string()],
        push_url: None,
        request_timeout_ms: None,
        instance_name: "test-host".to_string(),
        port: 0,
    }
}

type Shared = Arc<Mutex<FakeState>>;

fn error_response(status: StatusCode, canonical: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": { "code": status.as_u16(), "message": message, "status": canonical }
        })),
    )
        .into_response()
}

/// Record the request and return the configured failure, if any.
fn observe(state: &mut FakeState, headers: &HeaderMap) -> Option<Response> {
    state.authorization.push(
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );
    state
        .failure
        .as_ref()
        .map(|(status, canonical)| error_response(*status, canonical, "injected failure"))
}

async fn create_topic(
    State(state): State<Shared>,
    Path((project, topic)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(failure) = observe(&mut state, &headers) {
        return failure;
    }

    let path = format!("projects/{}/topics/{}", project, topic);
    if !state.topics.insert(path.clone()) {
        return error_response(StatusCode::CONFLICT, "ALREADY_EXISTS", "Topic already exists");
    }

    Json(json!({ "name": path })).into_response()
}

async fn create_subscription(
    State(state): State<Shared>,
    Path((project, subscription)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(failure) = observe(&mut state, &headers) {
        return failure;
    }

    let body: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", &e.to_string()),
    };

    let topic = body["topic"].as_str().unwrap_or_default().to_string();
    if !state.topics.contains(&topic) {
        return error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "Topic not found");
    }

    let path = format!("projects/{}/subscriptions/{}", project, subscription);
    if state.subscriptions.contains_key(&path) {
        return error_response(
            StatusCode::CONFLICT,
            "ALREADY_EXISTS",
            "Subscription already exists",
        );
    }

    state.subscriptions.insert(path.clone(), body.clone());
    let mut created = body;
    created["name"] = json!(path);
    Json(created).into_response()
}

async fn publish(
    State(state): State<Shared>,
    Path((project, topic)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(failure) = observe(&mut state, &headers) {
        return failure;
    }

    let Some(topic) = topic.strip_suffix(":publish") else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let path = format!("projects/{}/topics/{}", project, topic);
    if !state.topics.contains(&path) {
        return error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "Topic not found");
    }

    let body: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", &e.to_string()),
    };

    let mut ids = Vec::new();
    for message in body["messages"].as_array().cloned().unwrap_or_default() {
        state.next_id += 1;
        ids.push(state.next_id.to_string());
        state.published.push((path.clone(), message));
    }

    Json(json!({ "messageIds": ids })).into_response()
}
