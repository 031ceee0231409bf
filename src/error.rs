//! Error taxonomy shared by every component of the tour guide.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TourError {
    /// Dataset file missing, unreadable, or not a list of places.
    #[error("Place data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    #[error("Generation service error: {0}")]
    GenerationService(String),

    /// No vector index has been built or it cannot be read.
    #[error("Vector index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Index build failed: {0}")]
    IndexBuild(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No matching tourist places found.")]
    NoMatchFound,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TourError {
    /// True for system faults, false for outcomes caused by the request itself.
    pub fn is_fault(&self) -> bool {
        !matches!(self, Self::NoMatchFound | Self::InvalidRequest(_))
    }
}

pub type Result<T> = std::result::Result<T, TourError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_is_not_a_fault() {
        assert!(!TourError::NoMatchFound.is_fault());
        assert!(!TourError::InvalidRequest("empty".into()).is_fault());
        assert!(TourError::IndexUnavailable("missing".into()).is_fault());
        assert!(TourError::GenerationService("timeout".into()).is_fault());
    }

    #[test]
    fn test_no_match_message() {
        assert_eq!(
            TourError::NoMatchFound.to_string(),
            "No matching tourist places found."
        );
    }
}
