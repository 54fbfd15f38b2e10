use std::cell::RefCell;
use std::collections::HashMap;

use foundation::LngLat;

use crate::error::GeocodingError;
use crate::model::{DirectionsResponse, Place};
use crate::request::SearchOptions;
use crate::{Geocoder, LocalBoxFuture, Router};

/// Canned-answer geocoder for tests and offline runs.
///
/// Search answers are keyed by the trimmed, lowercased query. Reverse answers
/// match coordinates exactly, then fall back to the default answer (empty when
/// unset). Every call is recorded.
#[derive(Debug, Default)]
pub struct MemoryGeocoder {
    search: RefCell<HashMap<String, Vec<Place>>>,
    reverse: RefCell<Vec<(LngLat, Vec<Place>)>>,
    default_reverse: RefCell<Vec<Place>>,
    route: RefCell<Option<DirectionsResponse>>,
    failure: RefCell<Option<GeocodingError>>,
    calls: RefCell<Vec<String>>,
}

impl MemoryGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_search_results(&self, query: &str, places: Vec<Place>) {
        self.search.borrow_mut().insert(search_key(query), places);
    }

    pub fn set_reverse_results(&self, position: LngLat, places: Vec<Place>) {
        let mut reverse = self.reverse.borrow_mut();
        reverse.retain(|(p, _)| *p != position);
        reverse.push((position, places));
    }

    /// Answer for reverse lookups that match no registered position.
    pub fn set_default_reverse(&self, places: Vec<Place>) {
        *self.default_reverse.borrow_mut() = places;
    }

    pub fn set_route(&self, route: DirectionsResponse) {
        *self.route.borrow_mut() = Some(route);
    }

    /// Makes every subsequent call fail with `err` until [`Self::clear_failure`].
    pub fn fail_with(&self, err: GeocodingError) {
        *self.failure.borrow_mut() = Some(err);
    }

    pub fn clear_failure(&self) {
        self.failure.borrow_mut().take();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) -> Result<(), GeocodingError> {
        self.calls.borrow_mut().push(call);
        match self.failure.borrow().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn search_now(&self, query: &str) -> Result<Vec<Place>, GeocodingError> {
        self.record(format!("search:{query}"))?;
        if query.trim().is_empty() {
            return Err(GeocodingError::InvalidInput("empty search query".to_string()));
        }
        Ok(self
            .search
            .borrow()
            .get(&search_key(query))
            .cloned()
            .unwrap_or_default())
    }

    fn reverse_now(&self, position: LngLat) -> Result<Vec<Place>, GeocodingError> {
        self.record(format!("reverse:{position}"))?;
        let exact = self
            .reverse
            .borrow()
            .iter()
            .find(|(p, _)| *p == position)
            .map(|(_, places)| places.clone());
        Ok(exact.unwrap_or_else(|| self.default_reverse.borrow().clone()))
    }

    fn route_now(&self, waypoints: &[LngLat]) -> Result<DirectionsResponse, GeocodingError> {
        let joined = waypoints
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";");
        self.record(format!("directions:{joined}"))?;
        self.route
            .borrow()
            .clone()
            .ok_or_else(|| GeocodingError::Rejected("NoRoute".to_string()))
    }
}

fn search_key(query: &str) -> String {
    query.trim().to_lowercase()
}

impl Geocoder for MemoryGeocoder {
    fn search(
        &self,
        query: String,
        _options: SearchOptions,
    ) -> LocalBoxFuture<'_, Result<Vec<Place>, GeocodingError>> {
        let result = self.search_now(&query);
        Box::pin(async move { result })
    }

    fn reverse_lookup(
        &self,
        position: LngLat,
    ) -> LocalBoxFuture<'_, Result<Vec<Place>, GeocodingError>> {
        let result = self.reverse_now(position);
        Box::pin(async move { result })
    }
}

impl Router for MemoryGeocoder {
    fn directions(
        &self,
        waypoints: Vec<LngLat>,
    ) -> LocalBoxFuture<'_, Result<DirectionsResponse, GeocodingError>> {
        let result = self.route_now(&waypoints);
        Box::pin(async move { result })
    }
}
