//! Layered settings
//!
//! Built-in defaults, then `tourguide.toml`, then `tourguide.<RUST_ENV>.toml`,
//! then `TOURGUIDE_*` environment variables (`TOURGUIDE_GEMINI__API_KEY`
//! sets `gemini.api_key`). Relative data paths are resolved against the
//! config directory.

use std::env;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TourError};

pub const CONFIG_FILE: &str = "tourguide.toml";
const ENV_PREFIX: &str = "TOURGUIDE_";
const API_KEY_VAR: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub search: SearchSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSettings {
    pub places_path: PathBuf,
    pub index_path: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            places_path: PathBuf::from("data/places.json"),
            index_path: PathBuf::from("data/places_index.db"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub embed_model: String,
    pub generation_model: String,
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            embed_model: "gemini-embedding-001".to_string(),
            generation_model: "gemini-2.0-flash".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Neighbours returned by semantic queries without an explicit `top_k`.
    pub semantic_top_k: usize,
    pub embed_batch_size: usize,
    /// Answer unknown-location queries from the vector index when one is loaded.
    pub semantic_fallback: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            semantic_top_k: 5,
            embed_batch_size: 10,
            semantic_fallback: true,
        }
    }
}

impl Settings {
    /// Load from the current directory.
    pub fn load() -> Result<Self> {
        let dir = env::current_dir()
            .map_err(|e| TourError::Config(format!("cannot read current directory: {e}")))?;
        Self::load_from(&dir)
    }

    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut figment = Self::file_figment(dir);
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::extract(figment, dir)
    }

    /// Defaults plus config files in `dir`, without the environment layer.
    fn file_figment(dir: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(dir.join(CONFIG_FILE)));

        if let Ok(env_name) = env::var("RUST_ENV") {
            figment = figment.merge(Toml::file(dir.join(format!("tourguide.{env_name}.toml"))));
        }
        figment
    }

    fn extract(figment: Figment, dir: &Path) -> Result<Self> {
        let mut settings: Settings = figment
            .extract()
            .map_err(|e| TourError::Config(e.to_string()))?;

        if settings.gemini.api_key.as_deref().map_or(true, str::is_empty) {
            settings.gemini.api_key = env::var(API_KEY_VAR).ok().filter(|k| !k.is_empty());
        }

        settings.data.places_path = resolve_with_base(dir, &settings.data.places_path);
        settings.data.index_path = resolve_with_base(dir, &settings.data.index_path);
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.search.embed_batch_size == 0 {
            return Err(TourError::Config(
                "search.embed_batch_size must be at least 1".to_string(),
            ));
        }
        if self.gemini.timeout_secs == 0 {
            return Err(TourError::Config(
                "gemini.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Absolute paths are kept; relative ones are joined onto `base`.
pub fn resolve_with_base(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}
