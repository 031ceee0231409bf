use crate::core::place::PlaceRecord;

use super::intent::QueryIntent;
use super::scoring::score;

/// Places must score strictly above this to be returned.
pub const RELEVANCE_THRESHOLD: f64 = 5.0;

/// A place paired with its transient relevance score.
#[derive(Debug, Clone, Copy)]
pub struct ScoredPlace<'a> {
    pub place: &'a PlaceRecord,
    pub score: f64,
}

/// Score, filter and order places, keeping scores for inspection.
///
/// The sort is stable: equal scores keep their collection order.
pub fn rank_scored<'a>(places: &'a [PlaceRecord], intent: &QueryIntent) -> Vec<ScoredPlace<'a>> {
    let mut scored: Vec<ScoredPlace<'a>> = places
        .iter()
        .map(|place| ScoredPlace {
            place,
            score: score(place, intent),
        })
        .filter(|s| s.score > RELEVANCE_THRESHOLD)
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// Ranked places with scores stripped. Empty when nothing is relevant.
pub fn rank(places: &[PlaceRecord], intent: &QueryIntent) -> Vec<PlaceRecord> {
    rank_scored(places, intent)
        .into_iter()
        .map(|s| s.place.clone())
        .collect()
}
