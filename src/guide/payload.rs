//! Request and response shapes of the query operation.

use serde::{Deserialize, Serialize};

use crate::core::place::PlaceRecord;
use crate::search::intent::LocationType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    /// Overrides the count parsed from the query when greater than 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TourAnswer {
    pub success: bool,
    pub query: String,
    pub location: String,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub count: usize,
    pub suggestions: Vec<PlaceRecord>,
    pub ai_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TourFailure {
    pub success: bool,
    pub error: String,
}

/// Either a successful answer or a structured failure; both serialize
/// flat with a `success` flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Success(TourAnswer),
    Failure(TourFailure),
}

impl QueryResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure(TourFailure {
            success: false,
            error: error.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn answer(&self) -> Option<&TourAnswer> {
        match self {
            Self::Success(answer) => Some(answer),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(&failure.error),
        }
    }
}
