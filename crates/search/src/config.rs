//! Client configuration.
//!
//! A single node, addressed by host and port, with a connect timeout and a
//! socket timeout. Defaults point at a local development node.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Authentication configuration for Elasticsearch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ElasticsearchAuth {
    /// Basic username/password authentication.
    Basic {
        /// The username for basic auth.
        username: String,
        /// The password for basic auth.
        password: String,
    },
    /// Bearer token authentication.
    Bearer {
        /// The bearer token.
        token: String,
    },
}

/// Configuration for the Elasticsearch client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Host name of the node (default: `"localhost"`).
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port of the node (default: 9200).
    #[serde(default = "default_port")]
    pub port: u16,

    /// URL scheme, `http` or `https` (default: `"http"`).
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Time allowed to reach the node when connecting, in milliseconds (default: 1000).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Time allowed for any single request, in milliseconds (default: 5000).
    #[serde(default = "default_socket_timeout_ms")]
    pub socket_timeout_ms: u64,

    /// Optional authentication.
    #[serde(default)]
    pub auth: Option<ElasticsearchAuth>,

    /// Whether to disable certificate validation (default: false).
    /// Only use for development/testing.
    #[serde(default)]
    pub disable_certificate_validation: bool,

    /// Number of primary shards for indices created by this client (default: 1).
    #[serde(default = "default_shards")]
    pub number_of_shards: u32,

    /// Number of replica shards for indices created by this client (default: 1).
    #[serde(default = "default_replicas")]
    pub number_of_replicas: u32,

    /// Refresh interval for indices created by this client (default: "1s").
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    9200
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    1000
}

fn default_socket_timeout_ms() -> u64 {
    5000
}

fn default_shards() -> u32 {
    1
}

fn default_replicas() -> u32 {
    1
}

fn default_refresh_interval() -> String {
    "1s".to_string()
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            scheme: default_scheme(),
            connect_timeout_ms: default_connect_timeout_ms(),
            socket_timeout_ms: default_socket_timeout_ms(),
            auth: None,
            disable_certificate_validation: false,
            number_of_shards: default_shards(),
            number_of_replicas: default_replicas(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

impl ElasticsearchConfig {
    /// Creates a configuration for the given host and port with default timeouts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Returns the node URL, e.g. `http://localhost:9200`.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Socket (per-request) timeout as a [`Duration`].
    pub fn socket_timeout(&self) -> Duration {
        Duration::from_millis(self.socket_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ElasticsearchConfig::default();
        assert_eq!(config.url(), "http://localhost:9200");
        assert_eq!(config.connect_timeout(), Duration::from_millis(1000));
        assert_eq!(config.socket_timeout(), Duration::from_millis(5000));
        assert_eq!(config.number_of_shards, 1);
        assert!(config.auth.is_none());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ElasticsearchConfig =
            serde_json::from_str(r#"{"host": "es.internal", "scheme": "https"}"#).unwrap();
        assert_eq!(config.url(), "https://es.internal:9200");
        assert_eq!(config.socket_timeout_ms, 5000);
        assert_eq!(config.refresh_interval, "1s");
    }

    #[test]
    fn test_config_new() {
        let config = ElasticsearchConfig::new("127.0.0.1", 19200);
        assert_eq!(config.url(), "http://127.0.0.1:19200");
        assert_eq!(config.connect_timeout_ms, 1000);
    }
}
