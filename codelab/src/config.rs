//! Configuration module for environment variable parsing.
//!
//! All configuration comes from the process environment; there are no CLI flags.

use std::env;

use tracing::warn;
use url::Url;

/// Production Pub/Sub REST endpoint, used when no emulator is configured.
pub const DEFAULT_PUBSUB_ENDPOINT: &str = "https://pubsub.googleapis.com";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pub/Sub project identifier
    pub project_id: String,

    /// Base URL of the Pub/Sub REST API (emulator or production)
    pub pubsub_endpoint: String,

    /// Optional OAuth2 bearer token for the production service
    pub access_token: Option<String>,

    /// Topic that `/submit` publishes to
    pub topic: String,

    /// Push subscriptions created on the topic at startup
    pub subscriptions: Vec<String>,

    /// Destination of push deliveries, usually this service's `/push`
    pub push_url: Option<Url>,

    /// Outbound request timeout in milliseconds (none when unset)
    pub request_timeout_ms: Option<u64>,

    /// Name shown on the welcome page (`HOSTNAME`, else the kernel host name)
    pub instance_name: String,

    /// Port for the web server to listen on
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            project_id: env::var("PUBSUB_PROJECT_ID")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "local-project".to_string()),

            pubsub_endpoint: endpoint_from_emulator_host(env::var("PUBSUB_EMULATOR_HOST").ok()),

            access_token: env::var("PUBSUB_ACCESS_TOKEN")
                .ok()
                .filter(|v| !v.trim().is_empty()),

            topic: env::var("PUBSUB_TOPIC")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "jobs".to_string()),

            subscriptions: parse_csv("PUSH_SUBSCRIPTIONS")
                .unwrap_or_else(|| vec!["push1".to_string()]),

            push_url: parse_url("PUSH_URL"),

            request_timeout_ms: parse_number("REQUEST_TIMEOUT_MS"),

            instance_name: resolve_instance_name(env::var("HOSTNAME").ok()),

            port: parse_number("PORT").unwrap_or(8080),
        }
    }
}

/// Map `PUBSUB_EMULATOR_HOST` (a bare `host:port`) to a REST base URL.
fn endpoint_from_emulator_host(host: Option<String>) -> String {
    match host.map(|h| h.trim().trim_end_matches('/').to_string()) {
        Some(h) if h.starts_with("http://") || h.starts_with("https://") => h,
        Some(h) if !h.is_empty() => format!("http://{}", h),
        _ => DEFAULT_PUBSUB_ENDPOINT.to_string(),
    }
}

/// Use an explicit override when set, otherwise ask the OS for the host name.
fn resolve_instance_name(explicit: Option<String>) -> String {
    explicit
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| gethostname::gethostname().to_string_lossy().into_owned())
}

/// Parse a numeric variable, warning when it is set but unparsable.
fn parse_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid number, using default");
            None
        }
    }
}

/// Parse an absolute URL, dropping it with a warning when malformed.
fn parse_url(name: &str) -> Option<Url> {
    let raw = env::var(name).ok().filter(|v| !v.trim().is_empty())?;
    match Url::parse(raw.trim()) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(env_var = name, value = %raw, error = %e, "Invalid URL, ignoring");
            None
        }
    }
}

/// Parse a comma-separated list of strings.
fn parse_csv(name: &str) -> Option<Vec<String>> {
    env::var(name)
        .ok()
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|items| !items.is_empty())
}
