//! Division and category assignment for records that arrive without them.

use super::catalog::{CATEGORY_RULES, DIVISION_HINTS};
use super::place::{Category, Division, PlaceRecord};

/// Pick a division from the record's own text.
///
/// Division names in the place name win, then division names in the url,
/// then landmark hints anywhere in name, description, or url.
pub fn assign_division(place: &PlaceRecord) -> Division {
    let name = place.name.to_lowercase();
    let url = place.url.as_deref().unwrap_or("").to_lowercase();
    let combined = format!("{} {} {}", name, place.description_text().to_lowercase(), url);

    let by_name = |text: &str| {
        DIVISION_HINTS
            .iter()
            .find(|h| h.names.iter().any(|n| text.contains(n)))
            .map(|h| h.division)
    };

    by_name(&name)
        .or_else(|| by_name(&url))
        .or_else(|| {
            DIVISION_HINTS
                .iter()
                .find(|h| h.hints.iter().any(|k| combined.contains(k)))
                .map(|h| h.division)
        })
        .unwrap_or(Division::Unknown)
}

/// Categories whose keywords appear in the name or description, in
/// vocabulary order. Falls back to `General`.
pub fn assign_categories(place: &PlaceRecord) -> Vec<Category> {
    let combined = format!(
        "{} {}",
        place.name.to_lowercase(),
        place.description_text().to_lowercase()
    );

    let categories: Vec<Category> = CATEGORY_RULES
        .iter()
        .filter(|rule| rule.keywords.iter().any(|k| combined.contains(k)))
        .map(|rule| rule.category)
        .collect();

    if categories.is_empty() {
        vec![Category::General]
    } else {
        categories
    }
}

/// Fill in missing division/categories so the record satisfies the store
/// invariants. Known values are left untouched.
pub fn normalize(place: &mut PlaceRecord) {
    if !place.division.is_known() {
        place.division = assign_division(place);
    }

    if place.categories.is_empty() {
        place.categories = assign_categories(place);
    } else {
        let mut seen = Vec::with_capacity(place.categories.len());
        place.categories.retain(|c| {
            if seen.contains(c) {
                false
            } else {
                seen.push(*c);
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_division_from_name_beats_hints() {
        let place = PlaceRecord::new("Dhaka Gate", Division::Unknown)
            .with_description("Near the road to Cox's Bazar");
        assert_eq!(assign_division(&place), Division::Dhaka);
    }

    #[test]
    fn test_division_from_url() {
        let place = PlaceRecord::new("Central Park", Division::Unknown)
            .with_url("https://en.wikipedia.org/wiki/Rajshahi_Central_Park");
        assert_eq!(assign_division(&place), Division::Rajshahi);
    }

    #[test]
    fn test_division_from_hint() {
        let place = PlaceRecord::new("Swamp Forest", Division::Unknown)
            .with_description("Ratargul is a freshwater swamp forest");
        assert_eq!(assign_division(&place), Division::Sylhet);

        // kuakata appears under Khulna first
        let beach = PlaceRecord::new("Kuakata", Division::Unknown);
        assert_eq!(assign_division(&beach), Division::Khulna);
    }

    #[test]
    fn test_unplaceable_stays_unknown() {
        let place = PlaceRecord::new("Unnamed Village Pond", Division::Unknown);
        assert_eq!(assign_division(&place), Division::Unknown);
    }

    #[test]
    fn test_categories_in_vocabulary_order() {
        let place = PlaceRecord::new("Old Fort", Division::Dhaka)
            .with_description("Ancient fort beside the river with a small museum");
        assert_eq!(
            assign_categories(&place),
            vec![Category::Historical, Category::Museum, Category::River]
        );
    }

    #[test]
    fn test_categories_fall_back_to_general() {
        let place = PlaceRecord::new("Bazar", Division::Dhaka).with_description("Busy");
        assert_eq!(assign_categories(&place), vec![Category::General]);
    }

    #[test]
    fn test_normalize_keeps_known_values() {
        let mut place = PlaceRecord::new("Jaflong", Division::Sylhet)
            .with_description("Stone collection on the river")
            .with_categories(vec![Category::River, Category::River, Category::Hill]);
        normalize(&mut place);
        assert_eq!(place.division, Division::Sylhet);
        assert_eq!(place.categories, vec![Category::River, Category::Hill]);
    }

    #[test]
    fn test_normalize_fills_empty_categories() {
        let mut place = PlaceRecord::new("Patenga", Division::Unknown)
            .with_description("Sea beach near the port")
            .with_categories(Vec::new());
        normalize(&mut place);
        assert_eq!(place.division, Division::Chittagong);
        assert_eq!(place.categories, vec![Category::Beach]);
    }
}
