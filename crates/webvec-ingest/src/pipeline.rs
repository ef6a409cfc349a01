//! The ingestion pipeline: URLs in, a finalized record batch out.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use webvec_core::{
    BatchBuilder, Document, Embedder, OutputBatch, PipelineConfig, RecordMetadata, Result,
    VectorRecord, WebvecError,
};

use crate::chunker::SentenceChunker;
use crate::extract::ExtractorRegistry;
use crate::fetcher::Fetcher;
use crate::ids::chunk_id;

/// Per-run accounting. Failed URLs and skipped chunks are recoverable and
/// show up here rather than as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub urls_processed: usize,
    pub urls_failed: usize,
    pub documents_empty: usize,
    pub chunks_created: usize,
    pub chunks_embedded: usize,
    pub chunks_skipped: usize,
}

/// The finalized batch plus the accounting for how it was produced.
#[derive(Debug)]
pub struct IngestionReport {
    pub batch: OutputBatch,
    pub stats: PipelineStats,
}

/// Drives one ingestion run over a list of URLs.
///
/// Each URL is fetched, extracted, chunked, and embedded in sequence. A URL
/// that fails to fetch is logged and skipped; a document with no extractable
/// text yields zero chunks; a chunk whose embedding call fails is excluded
/// from the batch. None of these abort the run. Only cancellation and
/// invalid configuration do.
pub struct IngestionPipeline {
    config: PipelineConfig,
    fetcher: Fetcher,
    extractors: ExtractorRegistry,
    chunker: SentenceChunker,
    embedder: Arc<dyn Embedder>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for IngestionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl IngestionPipeline {
    pub fn new(config: PipelineConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::new(&config.fetch)?;
        let chunker = SentenceChunker::new(config.chunking.clone());
        Ok(Self {
            config,
            fetcher,
            extractors: ExtractorRegistry::with_defaults(),
            chunker,
            embedder,
            cancel: CancellationToken::new(),
        })
    }

    /// Replaces the cancellation token; cancelling it stops the run at the
    /// next document boundary.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn run(&self, urls: &[String]) -> Result<IngestionReport> {
        let mut builder = BatchBuilder::new(self.config.namespace.clone());
        let mut stats = PipelineStats::default();

        for (i, url) in urls.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(WebvecError::Cancelled);
            }
            if i > 0 && !self.config.fetch.pacing_delay.is_zero() {
                tokio::time::sleep(self.config.fetch.pacing_delay).await;
            }

            match self.process_url(url, &mut builder, &mut stats).await {
                Ok(()) => stats.urls_processed += 1,
                Err(e) => {
                    warn!(url = %url, error = %e, "skipping url");
                    stats.urls_failed += 1;
                }
            }
        }

        let batch = builder.finalize();
        info!(
            records = batch.len(),
            urls_processed = stats.urls_processed,
            urls_failed = stats.urls_failed,
            chunks_skipped = stats.chunks_skipped,
            "ingestion run complete"
        );
        Ok(IngestionReport { batch, stats })
    }

    async fn process_url(
        &self,
        url: &str,
        builder: &mut BatchBuilder,
        stats: &mut PipelineStats,
    ) -> Result<()> {
        let fetched = self.fetcher.fetch(url).await?;
        let extractor = self.extractors.get(fetched.content_type);
        let outcome = extractor.extract(&fetched.bytes);
        for warning in &outcome.warnings {
            warn!(url = %url, extractor = extractor.name(), "{warning}");
        }

        let document = Document::new(url, fetched.content_type, outcome.text);
        if document.is_empty() {
            warn!(url = %url, "no text extracted, dropping document");
            stats.documents_empty += 1;
            return Ok(());
        }

        let chunks = self.chunker.chunk(&document);
        stats.chunks_created += chunks.len();

        for chunk in chunks {
            builder.note_chunk();
            let embedding = match self.embedder.embed(&chunk.text).await {
                Ok(v) if !v.is_empty() => v,
                Ok(_) => {
                    warn!(url = %url, chunk = chunk.index, "empty embedding, skipping chunk");
                    stats.chunks_skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(url = %url, chunk = chunk.index, error = %e, "embedding failed, skipping chunk");
                    stats.chunks_skipped += 1;
                    continue;
                }
            };

            builder.push(VectorRecord {
                id: chunk_id(&chunk.source_url, chunk.index),
                embedding,
                metadata: RecordMetadata {
                    text: chunk.text,
                    source: chunk.source_url.clone(),
                    url: chunk.source_url,
                    chunk_index: chunk.index,
                    start_offset: chunk.start_offset,
                    end_offset: chunk.end_offset,
                    content_type: document.content_type,
                    generated_at: chrono::Utc::now(),
                },
            });
            stats.chunks_embedded += 1;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use webvec_core::{ChunkingConfig, FetchConfig, FixedEmbedder};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            chunking: ChunkingConfig::default()
                .with_chunk_size(60)
                .with_overlap(0),
            fetch: FetchConfig::default().with_pacing_delay(Duration::ZERO),
            namespace: Some("docs".to_string()),
        }
    }

    async fn mock_page(server: &MockServer, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                // set_body_string would override the content-type header
                // with text/plain, so set the mime alongside the body.
                ResponseTemplate::new(200).set_body_raw(body, "text/html"),
            )
            .mount(server)
            .await;
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        fn dimension(&self) -> usize {
            4
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.contains("poison") {
                return Err(WebvecError::Embedding("model refused".to_string()));
            }
            FixedEmbedder::new(4).embed(text).await
        }
    }

    #[tokio::test]
    async fn run_produces_records_and_skips_failed_urls() {
        let server = MockServer::start().await;
        mock_page(
            &server,
            "/good",
            "<html><body><p>First sentence about webvec ingestion here. \
             Second sentence with different words follows. \
             Third sentence closes the page.</p></body></html>",
        )
        .await;

        let urls = vec![
            format!("{}/good", server.uri()),
            format!("{}/missing", server.uri()),
        ];
        let pipeline =
            IngestionPipeline::new(test_config(), Arc::new(FixedEmbedder::new(8))).unwrap();
        let report = pipeline.run(&urls).await.unwrap();

        assert_eq!(report.stats.urls_processed, 1);
        assert_eq!(report.stats.urls_failed, 1);
        assert!(report.batch.len() > 1);
        assert_eq!(report.batch.namespace.as_deref(), Some("docs"));
        for record in &report.batch.records {
            assert_eq!(record.dimension(), 8);
            assert!(record.id.contains("_chunk_"));
        }
        // Indices are contiguous from zero for the single document.
        let indices: Vec<usize> = report
            .batch
            .records
            .iter()
            .map(|r| r.metadata.chunk_index)
            .collect();
        assert_eq!(indices, (0..indices.len()).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn identifiers_are_stable_across_runs() {
        let server = MockServer::start().await;
        mock_page(
            &server,
            "/page",
            "<html><body>Alpha sentence one goes here. Beta sentence two goes here. \
             Gamma sentence three goes here.</body></html>",
        )
        .await;

        let urls = vec![format!("{}/page", server.uri())];
        let pipeline =
            IngestionPipeline::new(test_config(), Arc::new(FixedEmbedder::new(4))).unwrap();
        let first = pipeline.run(&urls).await.unwrap();
        let second = pipeline.run(&urls).await.unwrap();

        let ids = |r: &IngestionReport| -> Vec<String> {
            r.batch.records.iter().map(|rec| rec.id.clone()).collect()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[tokio::test]
    async fn failed_embeddings_are_skipped_not_fatal() {
        let server = MockServer::start().await;
        mock_page(
            &server,
            "/page",
            "<html><body>A clean sentence that embeds fine here. \
             This one contains poison and will not embed. \
             Another clean closing sentence right here.</body></html>",
        )
        .await;

        let urls = vec![format!("{}/page", server.uri())];
        let pipeline = IngestionPipeline::new(test_config(), Arc::new(FailingEmbedder)).unwrap();
        let report = pipeline.run(&urls).await.unwrap();

        assert_eq!(report.stats.chunks_skipped, 1);
        assert_eq!(
            report.stats.chunks_embedded,
            report.stats.chunks_created - 1
        );
        assert_eq!(report.batch.summary.total_chunks_considered, report.stats.chunks_created);
        assert!(report
            .batch
            .records
            .iter()
            .all(|r| !r.metadata.text.contains("poison")));
    }

    #[tokio::test]
    async fn empty_documents_yield_zero_chunks() {
        let server = MockServer::start().await;
        mock_page(&server, "/empty", "<html><body><script>x()</script></body></html>").await;

        let urls = vec![format!("{}/empty", server.uri())];
        let pipeline =
            IngestionPipeline::new(test_config(), Arc::new(FixedEmbedder::new(4))).unwrap();
        let report = pipeline.run(&urls).await.unwrap();

        assert_eq!(report.stats.documents_empty, 1);
        assert_eq!(report.stats.chunks_created, 0);
        assert!(report.batch.is_empty());
    }

    #[tokio::test]
    async fn cancellation_aborts_the_run() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let pipeline = IngestionPipeline::new(test_config(), Arc::new(FixedEmbedder::new(4)))
            .unwrap()
            .with_cancellation(cancel);

        let err = pipeline
            .run(&["https://example.com/a".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, WebvecError::Cancelled));
    }

    #[test]
    fn invalid_chunking_config_is_rejected() {
        let config = PipelineConfig {
            chunking: ChunkingConfig::default().with_chunk_size(0),
            ..PipelineConfig::default()
        };
        let err = IngestionPipeline::new(config, Arc::new(FixedEmbedder::new(4))).unwrap_err();
        assert!(matches!(err, WebvecError::Config(_)));
    }
}
