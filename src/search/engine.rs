//! Semantic search engine - embedding provider plus flat vector index

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::embedding::{EmbeddingProvider, EmbeddingTask};
use super::vectordb::{BuildLock, FlatIndex, IndexedPlace};
use crate::core::place::PlaceRecord;
use crate::error::{Result, TourError};

pub const DEFAULT_BATCH_SIZE: usize = 10;

/// A semantic hit returned to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub place: PlaceRecord,
    pub distance: f32,
}

#[derive(Debug)]
pub struct IndexingStats {
    pub indexed: usize,
    /// Places without a description.
    pub skipped: usize,
    pub batches: usize,
    pub dimension: usize,
    pub duration_ms: u128,
}

/// Embed every described place and collect an in-memory index.
///
/// All batches must succeed; the first embedding error aborts the whole
/// build and nothing is returned.
pub async fn embed_places(
    places: &[PlaceRecord],
    provider: &dyn EmbeddingProvider,
    batch_size: usize,
) -> Result<(FlatIndex, IndexingStats)> {
    let start = Instant::now();
    let batch_size = batch_size.max(1);

    let described: Vec<(&PlaceRecord, String)> = places
        .iter()
        .filter_map(|p| p.embedding_text().map(|text| (p, text)))
        .collect();
    let skipped = places.len() - described.len();
    let total_batches = described.len().div_ceil(batch_size);

    let mut entries = Vec::with_capacity(described.len());
    for (batch_no, batch) in described.chunks(batch_size).enumerate() {
        debug!(batch = batch_no + 1, total = total_batches, "embedding batch");

        let texts: Vec<&str> = batch.iter().map(|(_, text)| text.as_str()).collect();
        let vectors = provider.embed_batch(&texts, EmbeddingTask::Document).await?;
        if vectors.len() != batch.len() {
            return Err(TourError::EmbeddingService(format!(
                "expected {} embeddings, got {}",
                batch.len(),
                vectors.len()
            )));
        }

        for ((place, _), embedding) in batch.iter().zip(vectors) {
            entries.push(IndexedPlace {
                position: entries.len(),
                place: (*place).clone(),
                embedding,
            });
        }
    }

    let index = FlatIndex::from_entries(entries, provider.model_name())?;
    let stats = IndexingStats {
        indexed: index.len(),
        skipped,
        batches: total_batches,
        dimension: index.dimension(),
        duration_ms: start.elapsed().as_millis(),
    };
    Ok((index, stats))
}

/// Build and persist the index at `path`.
///
/// Holds the build lock for the whole run and only replaces the file once
/// every place has been embedded.
pub async fn build_index(
    places: &[PlaceRecord],
    provider: &dyn EmbeddingProvider,
    batch_size: usize,
    path: &Path,
) -> Result<IndexingStats> {
    let _lock = BuildLock::acquire(path)?;

    let (index, stats) = embed_places(places, provider, batch_size).await?;
    index.persist(path)?;

    info!(
        path = %path.display(),
        indexed = stats.indexed,
        skipped = stats.skipped,
        dimension = stats.dimension,
        "vector index built"
    );
    Ok(stats)
}

/// Query-time engine. Cheap to clone; the index is shared read-only.
#[derive(Clone)]
pub struct SemanticEngine {
    provider: Arc<dyn EmbeddingProvider>,
    index: Option<Arc<FlatIndex>>,
}

impl SemanticEngine {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            index: None,
        }
    }

    pub fn with_index(mut self, index: FlatIndex) -> Self {
        if index.embedding_model() != self.provider.model_name() {
            warn!(
                index_model = index.embedding_model(),
                provider_model = self.provider.model_name(),
                "index was built with a different embedding model"
            );
        }
        self.index = Some(Arc::new(index));
        self
    }

    /// Open the persisted index at `path`.
    pub fn open(path: &Path, provider: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let index = FlatIndex::open(path)?;
        Ok(Self::new(provider).with_index(index))
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<&FlatIndex> {
        self.index.as_deref()
    }

    /// Embed `query` and return up to `k` places, nearest first.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let index = self
            .index
            .as_ref()
            .ok_or_else(|| TourError::IndexUnavailable("no index loaded".to_string()))?;

        let embedding = self.provider.embed(query, EmbeddingTask::Query).await?;
        let hits = index
            .search(&embedding, k)?
            .into_iter()
            .map(|n| SearchHit {
                place: n.place.clone(),
                distance: n.distance,
            })
            .collect::<Vec<_>>();

        debug!(query, k, hits = hits.len(), "semantic search");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::place::Division;
    use crate::search::embedding::LocalEmbedder;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn places() -> Vec<PlaceRecord> {
        vec![
            PlaceRecord::new("Cox's Bazar", Division::Chittagong)
                .with_description("The longest natural sea beach in the world"),
            PlaceRecord::new("No Description", Division::Dhaka),
            PlaceRecord::new("Sundarbans", Division::Khulna)
                .with_description("Mangrove forest and home of the Bengal tiger"),
            PlaceRecord::new("Srimangal", Division::Sylhet)
                .with_description("Rolling tea gardens and lemon orchards"),
            PlaceRecord::new("Paharpur", Division::Rajshahi)
                .with_description("Ruins of an ancient Buddhist monastery"),
        ]
    }

    /// Fails on the n-th batch call.
    struct FlakyEmbedder {
        inner: LocalEmbedder,
        fail_on: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for FlakyEmbedder {
        async fn embed(&self, text: &str, _task: EmbeddingTask) -> Result<Vec<f32>> {
            Ok(self.inner.embed_text(text))
        }

        async fn embed_batch(&self, texts: &[&str], task: EmbeddingTask) -> Result<Vec<Vec<f32>>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
                return Err(TourError::EmbeddingService("quota exceeded".to_string()));
            }
            let mut out = Vec::new();
            for t in texts {
                out.push(self.embed(t, task).await?);
            }
            Ok(out)
        }

        fn model_name(&self) -> &str {
            "flaky"
        }
    }

    /// Drops the last vector of every batch.
    struct ShortEmbedder(LocalEmbedder);

    #[async_trait]
    impl EmbeddingProvider for ShortEmbedder {
        async fn embed(&self, text: &str, _task: EmbeddingTask) -> Result<Vec<f32>> {
            Ok(self.0.embed_text(text))
        }

        async fn embed_batch(&self, texts: &[&str], _task: EmbeddingTask) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .skip(1)
                .map(|t| self.0.embed_text(t))
                .collect())
        }

        fn model_name(&self) -> &str {
            "short"
        }
    }

    #[tokio::test]
    async fn test_embed_places_skips_undescribed() -> anyhow::Result<()> {
        let provider = LocalEmbedder::with_dimension(64);
        let (index, stats) = embed_places(&places(), &provider, 2).await?;
        assert_eq!(stats.indexed, 4);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.batches, 2);
        assert_eq!(stats.dimension, 64);
        assert_eq!(index.entries()[1].place.name, "Sundarbans");
        assert_eq!(index.entries()[1].position, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_own_text_is_nearest() -> anyhow::Result<()> {
        let provider = Arc::new(LocalEmbedder::with_dimension(128));
        let (index, _) = embed_places(&places(), provider.as_ref(), 10).await?;
        let engine = SemanticEngine::new(provider).with_index(index);

        for place in places().iter().filter(|p| p.has_description()) {
            let text = place.embedding_text().unwrap_or_default();
            let hits = engine.search(&text, 1).await?;
            assert_eq!(hits[0].place.name, place.name);
            assert!(hits[0].distance < 1e-6);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_search_with_large_k_returns_population() -> anyhow::Result<()> {
        let provider = Arc::new(LocalEmbedder::with_dimension(32));
        let (index, _) = embed_places(&places(), provider.as_ref(), 10).await?;
        let engine = SemanticEngine::new(provider).with_index(index);

        let hits = engine.search("tea gardens", 100).await?;
        assert_eq!(hits.len(), 4);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
        Ok(())
    }

    #[tokio::test]
    async fn test_search_without_index() {
        let engine = SemanticEngine::new(Arc::new(LocalEmbedder::new()));
        let err = engine.search("beach", 5).await.unwrap_err();
        assert!(matches!(err, TourError::IndexUnavailable(_)));
    }

    #[tokio::test]
    async fn test_build_failure_leaves_previous_index() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("index.db");

        let good = LocalEmbedder::with_dimension(16);
        build_index(&places(), &good, 10, &path).await?;

        let flaky = FlakyEmbedder {
            inner: LocalEmbedder::with_dimension(16),
            fail_on: 2,
            calls: AtomicUsize::new(0),
        };
        let err = build_index(&places(), &flaky, 2, &path).await.unwrap_err();
        assert!(matches!(err, TourError::EmbeddingService(_)));

        let index = FlatIndex::open(&path)?;
        assert_eq!(index.embedding_model(), "local-htp");
        assert_eq!(index.len(), 4);
        // lock released even on failure
        assert!(BuildLock::acquire(&path).is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_embeddings_abort_build() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("index.db");

        let provider = ShortEmbedder(LocalEmbedder::with_dimension(16));
        let err = build_index(&places(), &provider, 2, &path).await.unwrap_err();
        match err {
            TourError::EmbeddingService(msg) => assert_eq!(msg, "expected 2 embeddings, got 1"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_build_without_existing_index_writes_nothing_on_failure() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("index.db");

        let flaky = FlakyEmbedder {
            inner: LocalEmbedder::with_dimension(16),
            fail_on: 1,
            calls: AtomicUsize::new(0),
        };
        assert!(build_index(&places(), &flaky, 10, &path).await.is_err());
        assert!(!path.exists());
        Ok(())
    }
}
