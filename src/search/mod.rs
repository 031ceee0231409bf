//! Retrieval for the tour guide
//!
//! Keyword path: intent extraction, scoring and rank-filtering.
//! Semantic path: embeddings plus a flat L2 vector index.

pub mod embedding;
pub mod engine;
pub mod intent;
pub mod rank;
pub mod scoring;
pub mod vectordb;

pub use embedding::{EmbeddingProvider, EmbeddingTask, LocalEmbedder};
pub use engine::{build_index, IndexingStats, SearchHit, SemanticEngine};
pub use intent::{extract, LocationType, QueryIntent};
pub use rank::{rank, rank_scored, ScoredPlace};
pub use vectordb::FlatIndex;
