//! HTTP client for the embedding model service.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use webvec_core::{Embedder, Result, WebvecError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct EmbedBatchRequest<'a> {
    texts: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedBatchResponse {
    embeddings: Vec<Vec<f32>>,
}

/// [`Embedder`] backed by an embedding service over HTTP.
///
/// The service exposes `GET /health` reporting the model and its dimension,
/// `POST /embed` for one text, and `POST /embed/batch` for many. The
/// dimension is captured once at connect time and every response is checked
/// against it; a drifting dimension means the service swapped models
/// mid-run, which would corrupt the batch.
pub struct RemoteEmbedder {
    http: Client,
    base_url: String,
    model: String,
    dimension: usize,
}

impl RemoteEmbedder {
    pub fn builder(base_url: impl Into<String>) -> RemoteEmbedderBuilder {
        RemoteEmbedderBuilder {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Connects with defaults and verifies the service is healthy.
    pub async fn connect(base_url: impl Into<String>) -> Result<Self> {
        Self::builder(base_url).connect().await
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(WebvecError::Embedding(format!(
                "service returned dimension {} but advertised {}",
                vector.len(),
                self.dimension
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for RemoteEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEmbedder")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimension", &self.dimension)
            .finish()
    }
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .http
            .post(format!("{}/embed", self.base_url))
            .json(&EmbedRequest { text })
            .send()
            .await
            .map_err(|e| WebvecError::Embedding(e.to_string()))?
            .error_for_status()
            .map_err(|e| WebvecError::Embedding(e.to_string()))?;

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| WebvecError::Embedding(format!("decoding response: {e}")))?;
        self.check_dimension(&body.embedding)?;
        Ok(body.embedding)
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .http
            .post(format!("{}/embed/batch", self.base_url))
            .json(&EmbedBatchRequest { texts })
            .send()
            .await
            .map_err(|e| WebvecError::Embedding(e.to_string()))?
            .error_for_status()
            .map_err(|e| WebvecError::Embedding(e.to_string()))?;

        let body: EmbedBatchResponse = response
            .json()
            .await
            .map_err(|e| WebvecError::Embedding(format!("decoding response: {e}")))?;

        if body.embeddings.len() != texts.len() {
            return Err(WebvecError::Embedding(format!(
                "requested {} embeddings, received {}",
                texts.len(),
                body.embeddings.len()
            )));
        }
        for vector in &body.embeddings {
            self.check_dimension(vector)?;
        }
        debug!(count = body.embeddings.len(), "embedded batch");
        Ok(body.embeddings)
    }
}

pub struct RemoteEmbedderBuilder {
    base_url: String,
    timeout: Duration,
}

impl RemoteEmbedderBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the client and queries `/health` to learn the model and its
    /// dimension. Fails if the service is unreachable or reports unhealthy.
    pub async fn connect(self) -> Result<RemoteEmbedder> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| WebvecError::Config(format!("http client: {e}")))?;

        let health: HealthResponse = http
            .get(format!("{base_url}/health"))
            .send()
            .await
            .map_err(|e| WebvecError::Embedding(format!("health check: {e}")))?
            .error_for_status()
            .map_err(|e| WebvecError::Embedding(format!("health check: {e}")))?
            .json()
            .await
            .map_err(|e| WebvecError::Embedding(format!("health check: {e}")))?;

        if health.status != "healthy" {
            return Err(WebvecError::Embedding(format!(
                "embedding service reported status {:?}",
                health.status
            )));
        }

        info!(
            model = %health.model,
            dimension = health.dimension,
            "connected to embedding service"
        );

        Ok(RemoteEmbedder {
            http,
            base_url,
            model: health.model,
            dimension: health.dimension,
        })
    }
}
