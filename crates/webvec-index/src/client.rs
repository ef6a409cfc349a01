//! HTTP client for the external vector-database service.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use webvec_core::{Result, VectorRecord, WebvecError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const API_KEY_HEADER: &str = "Api-Key";

/// Parameters for creating an index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
}

/// A snapshot of an index as reported by the service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexStats {
    pub dimension: usize,
    pub total_count: usize,
    #[serde(default)]
    pub namespaces: HashMap<String, usize>,
}

/// The vector-database operations this crate consumes. The service owns
/// index lifecycle; this side only requests it.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn list_indexes(&self) -> Result<Vec<String>>;

    async fn create_index(&self, spec: &IndexSpec) -> Result<()>;

    async fn delete_index(&self, name: &str) -> Result<()>;

    async fn describe_index_stats(&self, name: &str) -> Result<IndexStats>;

    /// Upserts records in submission order and returns the accepted count.
    async fn upsert(
        &self,
        name: &str,
        namespace: Option<&str>,
        records: &[VectorRecord],
    ) -> Result<usize>;
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    indexes: Vec<IndexEntry>,
}

#[derive(Debug, Deserialize)]
struct IndexEntry {
    name: String,
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: CloudSpec<'a>,
}

#[derive(Debug, Serialize)]
struct CloudSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct UpsertResponse {
    upserted_count: usize,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    dimension: usize,
    total_vector_count: usize,
    #[serde(default)]
    namespaces: HashMap<String, NamespaceStats>,
}

#[derive(Debug, Deserialize)]
struct NamespaceStats {
    vector_count: usize,
}

/// [`VectorIndex`] over HTTP, authenticated with an `Api-Key` header.
pub struct HttpVectorIndex {
    http: Client,
    base_url: String,
    api_key: String,
}

impl HttpVectorIndex {
    pub fn builder(base_url: impl Into<String>) -> HttpVectorIndexBuilder {
        HttpVectorIndexBuilder {
            base_url: base_url.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl std::fmt::Debug for HttpVectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpVectorIndex")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .finish()
    }
}

#[async_trait]
impl VectorIndex for HttpVectorIndex {
    async fn list_indexes(&self) -> Result<Vec<String>> {
        let body: ListResponse = self
            .http
            .get(self.url("/indexes"))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| WebvecError::Index(format!("listing indexes: {e}")))?
            .error_for_status()
            .map_err(|e| WebvecError::Index(format!("listing indexes: {e}")))?
            .json()
            .await
            .map_err(|e| WebvecError::Index(format!("decoding index list: {e}")))?;
        Ok(body.indexes.into_iter().map(|i| i.name).collect())
    }

    async fn create_index(&self, spec: &IndexSpec) -> Result<()> {
        self.http
            .post(self.url("/indexes"))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&CreateRequest {
                name: &spec.name,
                dimension: spec.dimension,
                metric: &spec.metric,
                spec: CloudSpec {
                    cloud: &spec.cloud,
                    region: &spec.region,
                },
            })
            .send()
            .await
            .map_err(|e| WebvecError::Index(format!("creating index {}: {e}", spec.name)))?
            .error_for_status()
            .map_err(|e| WebvecError::Index(format!("creating index {}: {e}", spec.name)))?;
        debug!(index = %spec.name, dimension = spec.dimension, "index creation requested");
        Ok(())
    }

    async fn delete_index(&self, name: &str) -> Result<()> {
        self.http
            .delete(self.url(&format!("/indexes/{name}")))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| WebvecError::Index(format!("deleting index {name}: {e}")))?
            .error_for_status()
            .map_err(|e| WebvecError::Index(format!("deleting index {name}: {e}")))?;
        Ok(())
    }

    async fn describe_index_stats(&self, name: &str) -> Result<IndexStats> {
        let body: StatsResponse = self
            .http
            .get(self.url(&format!("/indexes/{name}/stats")))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| WebvecError::Index(format!("describing index {name}: {e}")))?
            .error_for_status()
            .map_err(|e| WebvecError::Index(format!("describing index {name}: {e}")))?
            .json()
            .await
            .map_err(|e| WebvecError::Index(format!("decoding stats for {name}: {e}")))?;

        Ok(IndexStats {
            dimension: body.dimension,
            total_count: body.total_vector_count,
            namespaces: body
                .namespaces
                .into_iter()
                .map(|(k, v)| (k, v.vector_count))
                .collect(),
        })
    }

    async fn upsert(
        &self,
        name: &str,
        namespace: Option<&str>,
        records: &[VectorRecord],
    ) -> Result<usize> {
        let body: UpsertResponse = self
            .http
            .post(self.url(&format!("/indexes/{name}/vectors/upsert")))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&UpsertRequest {
                vectors: records,
                namespace,
            })
            .send()
            .await
            .map_err(|e| WebvecError::Index(format!("upserting into {name}: {e}")))?
            .error_for_status()
            .map_err(|e| WebvecError::Index(format!("upserting into {name}: {e}")))?
            .json()
            .await
            .map_err(|e| WebvecError::Index(format!("decoding upsert response: {e}")))?;
        Ok(body.upserted_count)
    }
}

pub struct HttpVectorIndexBuilder {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpVectorIndexBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpVectorIndex> {
        let api_key = self
            .api_key
            .ok_or_else(|| WebvecError::Config("vector index api key is required".to_string()))?;
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| WebvecError::Config(format!("http client: {e}")))?;
        Ok(HttpVectorIndex {
            http,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HttpVectorIndex {
        HttpVectorIndex::builder(server.uri())
            .api_key("test-key")
            .build()
            .unwrap()
    }

    #[test]
    fn build_requires_an_api_key() {
        let err = HttpVectorIndex::builder("http://localhost").build().unwrap_err();
        assert!(matches!(err, WebvecError::Config(_)));
    }

    #[test]
    fn debug_redacts_the_api_key() {
        let server_url = "http://localhost:9999";
        let index = HttpVectorIndex::builder(server_url)
            .api_key("super-secret")
            .build()
            .unwrap();
        let debug = format!("{index:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[redacted]"));
    }

    #[tokio::test]
    async fn list_indexes_sends_key_and_parses_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes"))
            .and(header(API_KEY_HEADER, "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "indexes": [{"name": "docs"}, {"name": "scratch"}],
            })))
            .mount(&server)
            .await;

        let names = client(&server).list_indexes().await.unwrap();
        assert_eq!(names, vec!["docs", "scratch"]);
    }

    #[tokio::test]
    async fn create_index_posts_the_full_spec() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexes"))
            .and(body_partial_json(json!({
                "name": "docs",
                "dimension": 384,
                "metric": "cosine",
                "spec": {"cloud": "aws", "region": "us-east-1"},
            })))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        client(&server)
            .create_index(&IndexSpec {
                name: "docs".to_string(),
                dimension: 384,
                metric: "cosine".to_string(),
                cloud: "aws".to_string(),
                region: "us-east-1".to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn describe_flattens_namespace_counts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/docs/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "dimension": 384,
                "total_vector_count": 120,
                "namespaces": {"docs": {"vector_count": 120}},
            })))
            .mount(&server)
            .await;

        let stats = client(&server).describe_index_stats("docs").await.unwrap();
        assert_eq!(stats.dimension, 384);
        assert_eq!(stats.total_count, 120);
        assert_eq!(stats.namespaces.get("docs"), Some(&120));
    }

    #[tokio::test]
    async fn upsert_failure_surfaces_as_index_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexes/docs/vectors/upsert"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server)
            .upsert("docs", None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, WebvecError::Index(_)));
    }
}
