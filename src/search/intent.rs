//! Query intent extraction
//!
//! Turns free text into a location target, a target type, a requested
//! result count and the keywords used for matching. Matching is plain
//! substring search over ordered tables: landmarks first, then divisions,
//! then country-wide terms.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::catalog::{find_entry, COUNTRY_TERMS, DIVISIONS, LANDMARKS};

pub const DEFAULT_COUNT: usize = 10;
pub const MAX_COUNT: usize = 50;

lazy_static! {
    static ref NUMBER_RE: Regex = Regex::new(r"\d+").unwrap();
    // text right before "top 5" / right after "5 spots", "12 places"
    static ref TOP_BEFORE_RE: Regex = Regex::new(r"\btop\s+$").unwrap();
    static ref UNIT_AFTER_RE: Regex = Regex::new(r"^\s+(?:spot|place)").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Specific,
    Division,
    General,
    Unknown,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Specific => "specific",
            Self::Division => "division",
            Self::General => "general",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for LocationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub location: String,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    #[serde(rename = "count")]
    pub requested_count: usize,
    pub search_keywords: Vec<String>,
}

/// Extract the intent of a query. Pure and order-sensitive.
pub fn extract(query: &str) -> QueryIntent {
    let lowered = query.to_lowercase();
    let requested_count = extract_count(&lowered);

    if let Some(entry) = find_entry(LANDMARKS, &lowered) {
        let mut keywords = vec![entry.label.to_string()];
        keywords.extend(
            entry
                .keywords
                .iter()
                .filter(|k| **k != entry.label)
                .map(|k| k.to_string()),
        );
        return QueryIntent {
            location: entry.label.to_string(),
            location_type: LocationType::Specific,
            requested_count,
            search_keywords: keywords,
        };
    }

    if let Some(entry) = find_entry(DIVISIONS, &lowered) {
        return QueryIntent {
            location: entry.label.to_string(),
            location_type: LocationType::Division,
            requested_count,
            search_keywords: entry.keywords.iter().map(|k| k.to_string()).collect(),
        };
    }

    if COUNTRY_TERMS.iter().any(|t| lowered.contains(t)) {
        return QueryIntent {
            location: "bangladesh".to_string(),
            location_type: LocationType::General,
            requested_count,
            search_keywords: vec!["bangladesh".to_string()],
        };
    }

    QueryIntent {
        location: query.to_string(),
        location_type: LocationType::Unknown,
        requested_count,
        search_keywords: vec![query.to_string()],
    }
}

/// Smallest number in 1..=50 used in a count phrase, else the default.
///
/// Numbers are whole digit runs, so "top 15" is 15 and never 1.
fn extract_count(lowered: &str) -> usize {
    NUMBER_RE
        .find_iter(lowered)
        .filter(|m| {
            TOP_BEFORE_RE.is_match(&lowered[..m.start()])
                || UNIT_AFTER_RE.is_match(&lowered[m.end()..])
        })
        .filter_map(|m| m.as_str().parse::<usize>().ok())
        .filter(|n| (1..=MAX_COUNT).contains(n))
        .min()
        .unwrap_or(DEFAULT_COUNT)
}
