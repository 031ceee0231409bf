//! Relevance scoring of a place against a query intent.
//!
//! Additive and keyword-by-keyword; every comparison is a case-insensitive
//! equality or substring check.

use crate::core::catalog::FAMOUS_SPOTS;
use crate::core::place::PlaceRecord;

use super::intent::{LocationType, QueryIntent};

const SPECIFIC_NAME_EXACT: f64 = 50.0;
const SPECIFIC_NAME_CONTAINS: f64 = 30.0;
const DIVISION_EXACT: f64 = 40.0;
const DIVISION_CONTAINS: f64 = 25.0;
const DESCRIPTION_CONTAINS: f64 = 15.0;
const URL_CONTAINS: f64 = 10.0;
const MINOR_FIELD_CONTAINS: f64 = 5.0;

const FAMOUS_MATCH: f64 = 30.0;
const RICH_DESCRIPTION_BONUS: f64 = 5.0;
const RICH_DESCRIPTION_MIN_CHARS: usize = 50;
const IMAGE_BONUS: f64 = 5.0;

struct LoweredFields {
    name: String,
    division: String,
    description: String,
    url: String,
}

impl LoweredFields {
    fn of(place: &PlaceRecord) -> Self {
        Self {
            name: place.name.to_lowercase(),
            division: place.division.as_str().to_lowercase(),
            description: place.description_text().to_lowercase(),
            url: place.url.as_deref().unwrap_or("").to_lowercase(),
        }
    }
}

/// Score `place` for `intent`. Always finite and non-negative.
///
/// Unknown intents score 0; the caller decides what to do with queries
/// that name no known location.
pub fn score(place: &PlaceRecord, intent: &QueryIntent) -> f64 {
    let fields = LoweredFields::of(place);

    match intent.location_type {
        LocationType::Specific => intent
            .search_keywords
            .iter()
            .map(|k| specific_keyword_score(&fields, &k.to_lowercase()))
            .sum(),
        LocationType::Division => intent
            .search_keywords
            .iter()
            .map(|k| division_keyword_score(&fields, &k.to_lowercase()))
            .sum(),
        LocationType::General => general_score(place, &fields),
        LocationType::Unknown => 0.0,
    }
}

fn specific_keyword_score(fields: &LoweredFields, keyword: &str) -> f64 {
    let mut score = 0.0;
    if fields.name == keyword {
        score += SPECIFIC_NAME_EXACT;
    } else if fields.name.contains(keyword) {
        score += SPECIFIC_NAME_CONTAINS;
    }
    if fields.description.contains(keyword) {
        score += DESCRIPTION_CONTAINS;
    }
    if fields.url.contains(keyword) {
        score += URL_CONTAINS;
    }
    if fields.division.contains(keyword) {
        score += MINOR_FIELD_CONTAINS;
    }
    score
}

fn division_keyword_score(fields: &LoweredFields, keyword: &str) -> f64 {
    let mut score = 0.0;
    if fields.division == keyword {
        score += DIVISION_EXACT;
    } else if fields.division.contains(keyword) {
        score += DIVISION_CONTAINS;
    }
    if fields.description.contains(keyword) {
        score += DESCRIPTION_CONTAINS;
    }
    if fields.url.contains(keyword) {
        score += URL_CONTAINS;
    }
    if fields.name.contains(keyword) {
        score += MINOR_FIELD_CONTAINS;
    }
    score
}

/// Country-wide queries only surface famous spots; anything else is 0.
fn general_score(place: &PlaceRecord, fields: &LoweredFields) -> f64 {
    let famous = FAMOUS_SPOTS
        .iter()
        .any(|k| fields.name.contains(k) || fields.description.contains(k));
    if !famous {
        return 0.0;
    }

    let mut score = FAMOUS_MATCH;
    if place.description_text().chars().count() > RICH_DESCRIPTION_MIN_CHARS {
        score += RICH_DESCRIPTION_BONUS;
    }
    if place.has_image() {
        score += IMAGE_BONUS;
    }
    score
}
