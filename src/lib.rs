//! bd-tour-guide library
//!
//! Answers travel questions about Bangladeshi tourist places.
//!
//! # Modules
//!
//! - `core`: place records, keyword tables, classification, dataset store
//! - `search`: intent extraction, relevance ranking, vector index
//! - `llm`: text generation and the Gemini client
//! - `guide`: the query service and its payloads
//! - `config`: layered settings

pub mod config;
pub mod core;
pub mod error;
pub mod guide;
pub mod llm;
pub mod search;

// Re-exports for convenience
pub use crate::config::Settings;
pub use crate::core::place::{Category, Division, PlaceRecord};
pub use crate::core::stats::DatasetStats;
pub use crate::core::store::PlaceStore;
pub use crate::error::{Result, TourError};
pub use crate::guide::{QueryRequest, QueryResponse, TourGuide};
pub use crate::search::intent::{extract, LocationType, QueryIntent};
