//! Text embedding capability
//!
//! `EmbeddingProvider` is the seam to the external embedding service.
//! `LocalEmbedder` is a deterministic, model-free stand-in based on
//! harmonic token projection: every token is read as a base-2^16 integer,
//! reduced modulo a set of coprime moduli, and each residue is placed on the
//! unit circle. Token vectors are mean-pooled and L2-normalized. It needs no
//! network and no model file, which makes it useful offline and in tests.

use std::f64::consts::PI;

use async_trait::async_trait;

use crate::error::Result;

/// Which side of retrieval a text is embedded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingTask {
    /// Place text stored in the index.
    Document,
    /// User query matched against the index.
    Query,
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>>;

    /// Embed several texts. The default calls [`embed`](Self::embed) in turn;
    /// backends with native batching override it.
    async fn embed_batch(&self, texts: &[&str], task: EmbeddingTask) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text, task).await?);
        }
        Ok(vectors)
    }

    /// Identifier stored next to the index so mismatched models are visible.
    fn model_name(&self) -> &str;
}

/// Code points of a token beyond this are ignored.
const MAX_TOKEN_CHARS: usize = 64;

pub struct LocalEmbedder {
    moduli: Vec<u64>,
}

impl LocalEmbedder {
    pub const DEFAULT_DIMENSION: usize = 384;

    pub fn new() -> Self {
        Self::with_dimension(Self::DEFAULT_DIMENSION)
    }

    /// Dimension is rounded down to an even number (two values per modulus).
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            moduli: first_primes((dimension / 2).max(1)),
        }
    }

    pub fn dimension(&self) -> usize {
        self.moduli.len() * 2
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return vec![0.0; self.dimension()];
        }

        let mut pooled = vec![0.0f64; self.dimension()];
        for token in &tokens {
            let n = token_value(token);
            for (i, &m) in self.moduli.iter().enumerate() {
                let theta = 2.0 * PI * ((n % m) as f64) / (m as f64);
                pooled[2 * i] += theta.sin();
                pooled[2 * i + 1] += theta.cos();
            }
        }

        let count = tokens.len() as f64;
        for value in &mut pooled {
            *value /= count;
        }

        let norm = pooled.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            pooled.iter().map(|v| (v / norm) as f32).collect()
        } else {
            pooled.iter().map(|v| *v as f32).collect()
        }
    }
}

impl Default for LocalEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbedder {
    async fn embed(&self, text: &str, _task: EmbeddingTask) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    fn model_name(&self) -> &str {
        "local-htp"
    }
}

/// Lowercase words split on whitespace and punctuation.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect()
}

fn token_value(token: &str) -> u64 {
    token
        .chars()
        .take(MAX_TOKEN_CHARS)
        .fold(0u64, |n, c| n.wrapping_mul(65536).wrapping_add(c as u64))
}

fn first_primes(count: usize) -> Vec<u64> {
    let mut primes: Vec<u64> = Vec::with_capacity(count);
    let mut candidate = 2u64;
    while primes.len() < count {
        if primes
            .iter()
            .take_while(|p| *p * *p <= candidate)
            .all(|p| candidate % p != 0)
        {
            primes.push(candidate);
        }
        candidate += 1;
    }
    primes
}
