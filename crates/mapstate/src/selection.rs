use geocoding::{Place, PlaceDetails};

/// Base name of places created from unmatched clicks.
pub const AD_HOC_NAME: &str = "New Marker";

/// Places the user explicitly added, in insertion order.
///
/// Appends are rejected when the candidate's center equals the last entry's
/// center exactly; earlier entries are not checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectedPlaces {
    places: Vec<Place>,
}

impl SelectedPlaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the list changed.
    pub fn add(&mut self, place: Place) -> bool {
        if self.last().is_some_and(|last| last.same_center(&place)) {
            return false;
        }
        self.places.push(place);
        true
    }

    /// Replaces the whole list (edits made by the places panel).
    pub fn replace(&mut self, places: Vec<Place>) {
        self.places = places;
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn last(&self) -> Option<&Place> {
        self.places.last()
    }

    pub fn as_slice(&self) -> &[Place] {
        &self.places
    }

    pub fn iter(&self) -> impl Iterator<Item = &Place> + '_ {
        self.places.iter()
    }

    /// Entries whose text contains [`AD_HOC_NAME`].
    pub fn count_ad_hoc(&self) -> usize {
        self.places
            .iter()
            .filter(|p| p.text.contains(AD_HOC_NAME))
            .count()
    }

    /// `"New Marker"` when no ad-hoc entry exists yet, otherwise
    /// `"New Marker {count + 1}"`.
    pub fn next_ad_hoc_name(&self) -> String {
        match self.count_ad_hoc() {
            0 => AD_HOC_NAME.to_string(),
            n => format!("{AD_HOC_NAME} {}", n + 1),
        }
    }

    pub fn details(&self) -> Vec<PlaceDetails> {
        self.places.iter().map(PlaceDetails::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::LngLat;

    fn place(text: &str, lng: f64, lat: f64) -> Place {
        Place::new(format!("poi.{text}"), text, LngLat::new(lng, lat))
    }

    #[test]
    fn duplicate_of_last_is_rejected() {
        let mut s = SelectedPlaces::new();
        assert!(s.add(place("a", 1.0, 2.0)));
        assert!(!s.add(place("b", 1.0, 2.0)));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn only_last_entry_is_checked() {
        let mut s = SelectedPlaces::new();
        assert!(s.add(place("a", 1.0, 2.0)));
        assert!(s.add(place("b", 3.0, 4.0)));
        assert!(s.add(place("c", 1.0, 2.0)));
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn near_but_not_equal_is_not_a_duplicate() {
        let mut s = SelectedPlaces::new();
        s.add(place("a", 1.0, 2.0));
        assert!(s.add(place("b", 1.0, 2.000_000_1)));
    }

    #[test]
    fn ad_hoc_names_increase_strictly() {
        let mut s = SelectedPlaces::new();
        s.add(place("Cafe", 0.0, 0.0));
        assert_eq!(s.next_ad_hoc_name(), "New Marker");

        let mut seen = Vec::new();
        for i in 0..4 {
            let name = s.next_ad_hoc_name();
            seen.push(name.clone());
            s.add(place(&name, 1.0 + i as f64, 1.0));
        }
        assert_eq!(
            seen,
            vec!["New Marker", "New Marker 2", "New Marker 3", "New Marker 4"]
        );
        assert_eq!(s.count_ad_hoc(), 4);
    }

    #[test]
    fn details_summarize_in_order() {
        let mut s = SelectedPlaces::new();
        s.add(place("a", 1.0, 2.0));
        s.add(place("b", 3.0, 4.0));
        let d = s.details();
        assert_eq!(d[0].name, "a");
        assert_eq!(d[1].coordinates, LngLat::new(3.0, 4.0));
    }
}
