//! CLI commands. Each `run` returns `anyhow::Result` and prints either
//! colored text or JSON.

pub mod index;
pub mod intent;
pub mod query;
pub mod semantic;
pub mod stats;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use bd_tour_guide::config::Settings;
use bd_tour_guide::llm::GeminiClient;
use bd_tour_guide::search::embedding::{EmbeddingProvider, LocalEmbedder};
use bd_tour_guide::search::engine::SemanticEngine;
use bd_tour_guide::search::vectordb::FlatIndex;
use bd_tour_guide::{PlaceStore, TourGuide};

/// Model name recorded by indexes built with `--local`.
const LOCAL_MODEL: &str = "local-htp";

pub fn load_settings(config_dir: Option<&Path>) -> Result<Settings> {
    let settings = match config_dir {
        Some(dir) => Settings::load_from(dir),
        None => Settings::load(),
    }
    .context("Failed to load settings")?;
    debug!(?settings.data, "settings loaded");
    Ok(settings)
}

pub fn load_store(settings: &Settings) -> Result<Arc<PlaceStore>> {
    let store = PlaceStore::load(&settings.data.places_path)?;
    Ok(Arc::new(store))
}

/// Embedding backend for building (`local`) or for querying an index built
/// with `model`.
pub fn embedding_provider(settings: &Settings, local: bool) -> Result<Arc<dyn EmbeddingProvider>> {
    if local {
        return Ok(Arc::new(LocalEmbedder::new()));
    }
    let client = GeminiClient::new(&settings.gemini)?;
    Ok(Arc::new(client))
}

/// Open the persisted index with a matching embedding backend.
pub fn open_engine(settings: &Settings) -> Result<SemanticEngine> {
    let index = FlatIndex::open(&settings.data.index_path)?;
    let provider = embedding_provider(settings, index.embedding_model() == LOCAL_MODEL)?;
    Ok(SemanticEngine::new(provider).with_index(index))
}

/// Assemble the query service. The vector index is optional: when it cannot
/// be opened the guide runs keyword-only.
pub fn build_guide(settings: &Settings) -> Result<TourGuide> {
    let store = load_store(settings)?;
    let generator = Arc::new(GeminiClient::new(&settings.gemini)?);
    let mut guide = TourGuide::new(store, generator, settings.search.clone());

    if !settings.data.index_path.exists() {
        debug!(path = %settings.data.index_path.display(), "no vector index, keyword search only");
        return Ok(guide);
    }
    match open_engine(settings) {
        Ok(engine) => guide = guide.with_semantic(engine),
        Err(e) => warn!(error = %e, "semantic search disabled"),
    }
    Ok(guide)
}

/// Run an async command body on a fresh runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    Ok(runtime.block_on(future))
}
