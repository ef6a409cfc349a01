//! The embedding capability consumed by the pipeline.
//!
//! The model is an injected dependency: the caller constructs one handle,
//! and the pipeline reuses it for every chunk. It is read-only after
//! initialization and safe to share.

use async_trait::async_trait;

use crate::error::Result;

/// Maps chunk text to fixed-length float vectors. The dimension is a
/// model-level constant, queryable before any embedding call and constant
/// for the lifetime of the handle.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embedding dimension every call will produce.
    fn dimension(&self) -> usize;

    /// Embeds a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embeds a batch of texts, preserving order.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Deterministic embedder producing fixed vectors derived from the text
/// bytes. No model, no network; intended for tests and dry runs. The same
/// text always yields the same vector.
#[derive(Debug, Clone)]
pub struct FixedEmbedder {
    dimension: usize,
}

impl FixedEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut seed = 0u32;
        for byte in text.bytes() {
            seed = seed.wrapping_mul(31).wrapping_add(u32::from(byte));
        }
        Ok((0..self.dimension)
            .map(|i| {
                let v = seed.wrapping_add(i as u32).wrapping_mul(2_654_435_761);
                (v % 1000) as f32 / 1000.0
            })
            .collect())
    }
}
