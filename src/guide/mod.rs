//! Query answering: ranking or retrieval followed by a generated reply.

pub mod compose;
pub mod payload;
pub mod service;

pub use payload::{QueryRequest, QueryResponse, TourAnswer, TourFailure};
pub use service::TourGuide;
