use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::classify::normalize;
use super::place::PlaceRecord;
use crate::error::{Result, TourError};

/// Read-only collection of places loaded from a JSON dataset.
///
/// Records are normalized on the way in, so every stored place has a
/// division (possibly `Unknown`) and at least one category.
#[derive(Debug, Clone)]
pub struct PlaceStore {
    places: Vec<PlaceRecord>,
    source: Option<PathBuf>,
}

impl PlaceStore {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TourError::DataUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;

        let places: Vec<PlaceRecord> = serde_json::from_str(&content).map_err(|e| {
            TourError::DataUnavailable(format!("invalid place data in {}: {}", path.display(), e))
        })?;

        let mut store = Self::from_places(places);
        store.source = Some(path.to_path_buf());
        info!(path = %path.display(), places = store.len(), "loaded place dataset");
        Ok(store)
    }

    pub fn from_places(mut places: Vec<PlaceRecord>) -> Self {
        for place in &mut places {
            normalize(place);
        }
        debug!(places = places.len(), "normalized place records");

        Self {
            places,
            source: None,
        }
    }

    pub fn places(&self) -> &[PlaceRecord] {
        &self.places
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
