//! Place search, reverse lookup and routing against a Mapbox-compatible service.
//!
//! [`Geocoder`] and [`Router`] are the seams the map state depends on;
//! [`MapboxClient`] talks HTTP, [`MemoryGeocoder`] answers from canned data.

pub mod config;
pub mod error;
pub mod mapbox;
pub mod memory;
pub mod model;
pub mod request;

use std::future::Future;
use std::pin::Pin;

use foundation::LngLat;

pub use config::GeocodingConfig;
pub use error::GeocodingError;
pub use mapbox::MapboxClient;
pub use memory::MemoryGeocoder;
pub use model::{
    DirectionsResponse, LineString, Place, PlaceContext, PlaceDetails, PlacesResponse, Route,
    Waypoint,
};
pub use request::SearchOptions;

/// Boxed future without a `Send` bound: lookups run on the UI thread and
/// browser implementations hold `!Send` JS handles.
pub type LocalBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Forward search and reverse lookup of place candidates.
pub trait Geocoder {
    /// Ranked candidates for free-text `query`, best first.
    fn search(
        &self,
        query: String,
        options: SearchOptions,
    ) -> LocalBoxFuture<'_, Result<Vec<Place>, GeocodingError>>;

    /// Candidates containing `position`; at most the configured reverse limit.
    fn reverse_lookup(
        &self,
        position: LngLat,
    ) -> LocalBoxFuture<'_, Result<Vec<Place>, GeocodingError>>;
}

/// Driving directions between waypoints.
pub trait Router {
    fn directions(
        &self,
        waypoints: Vec<LngLat>,
    ) -> LocalBoxFuture<'_, Result<DirectionsResponse, GeocodingError>>;
}
