//! Long-lived Elasticsearch client.
//!
//! Wraps the `elasticsearch` crate's client with the host, port and timeouts
//! from [`ElasticsearchConfig`]. The transport owns its own HTTP connection
//! handling; this type only builds it once and hands out references.

use std::fmt::Debug;

use elasticsearch::auth::Credentials;
use elasticsearch::cert::CertificateValidation;
use elasticsearch::cluster::ClusterHealthParts;
use elasticsearch::http::response::Response;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use elasticsearch::{Elasticsearch, SearchParts};
use serde_json::Value;

use crate::config::{ElasticsearchAuth, ElasticsearchConfig};
use crate::error::{BackendError, StorageError, StorageResult};
use crate::query::SearchRequest;
use crate::types::SearchResponse;

/// Elasticsearch client bound to a single node.
///
/// Cloning is cheap; clones share the underlying transport.
#[derive(Clone)]
pub struct ElasticClient {
    client: Elasticsearch,
    config: ElasticsearchConfig,
}

impl Debug for ElasticClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticClient")
            .field("url", &self.config.url())
            .field("connect_timeout_ms", &self.config.connect_timeout_ms)
            .field("socket_timeout_ms", &self.config.socket_timeout_ms)
            .finish_non_exhaustive()
    }
}

impl ElasticClient {
    /// Builds a client without contacting the node.
    pub fn new(config: ElasticsearchConfig) -> StorageResult<Self> {
        let client = Self::build_client(&config)?;
        Ok(Self { client, config })
    }

    /// Builds a client and pings the node, bounded by the connect timeout.
    pub async fn connect(config: ElasticsearchConfig) -> StorageResult<Self> {
        let client = Self::new(config)?;
        client.ping().await?;
        tracing::info!(url = %client.config.url(), "Connected to Elasticsearch");
        Ok(client)
    }

    fn build_client(config: &ElasticsearchConfig) -> StorageResult<Elasticsearch> {
        let url = config.url();
        let parsed_url: elasticsearch::http::Url = url.parse().map_err(|e| {
            StorageError::Backend(BackendError::ConnectionFailed {
                url: url.clone(),
                message: format!("Invalid URL: {}", e),
            })
        })?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);

        let mut builder = TransportBuilder::new(conn_pool).timeout(config.socket_timeout());

        if config.disable_certificate_validation {
            builder = builder.cert_validation(CertificateValidation::None);
        }

        if let Some(ref auth) = config.auth {
            builder = match auth {
                ElasticsearchAuth::Basic { username, password } => {
                    builder.auth(Credentials::Basic(username.clone(), password.clone()))
                }
                ElasticsearchAuth::Bearer { token } => {
                    builder.auth(Credentials::Bearer(token.clone()))
                }
            };
        }

        let transport = builder.build().map_err(|e| {
            StorageError::Backend(BackendError::ConnectionFailed {
                url: url.clone(),
                message: format!("Failed to build transport: {}", e),
            })
        })?;

        Ok(Elasticsearch::new(transport))
    }

    /// Returns the underlying `elasticsearch` client.
    pub fn inner(&self) -> &Elasticsearch {
        &self.client
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ElasticsearchConfig {
        &self.config
    }

    /// Pings the node. Fails if it does not answer within the connect timeout.
    pub async fn ping(&self) -> StorageResult<()> {
        let url = self.config.url();
        let response = tokio::time::timeout(
            self.config.connect_timeout(),
            self.client.ping().send(),
        )
        .await
        .map_err(|_| {
            StorageError::Backend(BackendError::ConnectionFailed {
                url: url.clone(),
                message: format!(
                    "no answer within {}ms",
                    self.config.connect_timeout_ms
                ),
            })
        })?
        .map_err(|e| {
            StorageError::Backend(BackendError::ConnectionFailed {
                url: url.clone(),
                message: e.to_string(),
            })
        })?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(StorageError::Backend(BackendError::ConnectionFailed {
                url,
                message: format!("ping returned status {}", status),
            }));
        }
        Ok(())
    }

    /// Checks cluster health. A `red` cluster is reported as unavailable.
    ///
    /// Returns the reported status (`green` or `yellow`).
    pub async fn health_check(&self) -> StorageResult<String> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable {
                message: format!("Health check failed: {}", e),
            })?;

        let body = read_json(response).await?;
        let cluster_status = body
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or("unknown")
            .to_string();

        if cluster_status == "red" {
            tracing::warn!(cluster = ?body.get("cluster_name"), "Cluster status is red");
            return Err(StorageError::Backend(BackendError::Unavailable {
                message: format!("Cluster status is red: {:?}", body),
            }));
        }

        Ok(cluster_status)
    }

    /// Runs a search request directly against the client, bypassing the
    /// repository and template layers.
    pub async fn search(&self, request: &SearchRequest) -> StorageResult<SearchResponse> {
        let indices: Vec<&str> = request.indices().iter().map(String::as_str).collect();
        let body = request.search_source().to_json();
        tracing::debug!(indices = ?indices, body = %body, "Raw search");

        let response = self
            .client
            .search(SearchParts::Index(&indices))
            .body(body)
            .send()
            .await?;

        let body = read_json(response).await?;
        SearchResponse::from_json(body)
    }

    /// Releases the client. The transport drops its pooled connections.
    pub fn close(self) {
        tracing::info!(url = %self.config.url(), "Closing Elasticsearch client");
    }
}

/// Reads a JSON body, turning non-success statuses into store errors.
pub(crate) async fn read_json(response: Response) -> StorageResult<Value> {
    let status = response.status_code();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StorageError::from_response(status.as_u16(), &body));
    }

    response.json::<Value>().await.map_err(|e| {
        StorageError::Backend(BackendError::Serialization {
            message: format!("Failed to parse response: {}", e),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_without_node() {
        let client = ElasticClient::new(ElasticsearchConfig::default()).unwrap();
        assert_eq!(client.config().url(), "http://localhost:9200");
        let debug = format!("{:?}", client);
        assert!(debug.contains("localhost:9200"));
    }

    #[test]
    fn test_client_rejects_invalid_url() {
        let config = ElasticsearchConfig {
            host: "bad host name".to_string(),
            ..Default::default()
        };
        let err = ElasticClient::new(config).unwrap_err();
        assert!(matches!(
            err,
            StorageError::Backend(BackendError::ConnectionFailed { .. })
        ));
    }

    #[test]
    fn test_client_with_basic_auth() {
        let config = ElasticsearchConfig {
            auth: Some(ElasticsearchAuth::Basic {
                username: "elastic".to_string(),
                password: "changeme".to_string(),
            }),
            ..Default::default()
        };
        assert!(ElasticClient::new(config).is_ok());
    }

    #[tokio::test]
    async fn test_connect_fails_fast_without_node() {
        // Port 9 (discard) is not an Elasticsearch node on any test machine.
        let config = ElasticsearchConfig {
            port: 9,
            connect_timeout_ms: 200,
            ..Default::default()
        };
        let err = ElasticClient::connect(config).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::Backend(BackendError::ConnectionFailed { .. })
        ));
    }
}
