use std::collections::BTreeMap;

use serde::Serialize;

use super::place::PlaceRecord;

/// Aggregate counts over the place dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetStats {
    pub total_places: usize,
    pub by_division: BTreeMap<String, usize>,
    /// A place with N categories contributes to N buckets.
    pub by_category: BTreeMap<String, usize>,
    pub places_with_images: usize,
    pub places_with_descriptions: usize,
}

impl DatasetStats {
    pub fn collect(places: &[PlaceRecord]) -> Self {
        let mut stats = Self {
            total_places: places.len(),
            ..Self::default()
        };

        for place in places {
            *stats
                .by_division
                .entry(place.division.as_str().to_string())
                .or_insert(0) += 1;

            for category in &place.categories {
                *stats
                    .by_category
                    .entry(category.as_str().to_string())
                    .or_insert(0) += 1;
            }

            if place.has_image() {
                stats.places_with_images += 1;
            }
            if place.has_description() {
                stats.places_with_descriptions += 1;
            }
        }

        stats
    }
}
