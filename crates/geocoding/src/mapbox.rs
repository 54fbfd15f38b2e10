use std::sync::Arc;

use foundation::LngLat;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::config::GeocodingConfig;
use crate::error::GeocodingError;
use crate::model::{DirectionsResponse, Place, PlacesResponse};
use crate::request::{self, SearchOptions};
use crate::{Geocoder, LocalBoxFuture, Router};

/// HTTP client for the geocoding and directions endpoints.
///
/// No retries and no timeouts beyond reqwest's defaults.
#[derive(Clone, Debug)]
pub struct MapboxClient {
    config: Arc<GeocodingConfig>,
    http: reqwest::Client,
}

impl MapboxClient {
    pub fn new(config: GeocodingConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: GeocodingConfig, http: reqwest::Client) -> Self {
        Self {
            config: Arc::new(config),
            http,
        }
    }

    pub fn config(&self) -> &GeocodingConfig {
        &self.config
    }

    pub async fn search_places(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<PlacesResponse, GeocodingError> {
        let url = request::search_url(&self.config, query, options)?;
        self.get_json(url, "search").await
    }

    pub async fn reverse(&self, position: LngLat) -> Result<PlacesResponse, GeocodingError> {
        let url = request::reverse_url(&self.config, position)?;
        self.get_json(url, "reverse lookup").await
    }

    pub async fn route(&self, waypoints: &[LngLat]) -> Result<DirectionsResponse, GeocodingError> {
        let url = request::directions_url(&self.config, waypoints)?;
        let resp: DirectionsResponse = self.get_json(url, "directions").await?;
        if !resp.is_ok() {
            return Err(GeocodingError::Rejected(resp.code));
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        what: &'static str,
    ) -> Result<T, GeocodingError> {
        let target = request::redacted(&url);
        debug!("{what} request: {target}");
        let result = self.fetch_json(url).await;
        if let Err(err) = &result {
            error!("{what} failed: {target} -> {err}");
        }
        result
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GeocodingError> {
        // reqwest errors embed the URL, which carries the token.
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| GeocodingError::Transport(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GeocodingError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let text = resp
            .text()
            .await
            .map_err(|e| GeocodingError::Transport(e.without_url().to_string()))?;
        serde_json::from_str(&text).map_err(|e| GeocodingError::Decode(e.to_string()))
    }
}

impl Geocoder for MapboxClient {
    fn search(
        &self,
        query: String,
        options: SearchOptions,
    ) -> LocalBoxFuture<'_, Result<Vec<Place>, GeocodingError>> {
        Box::pin(async move { Ok(self.search_places(&query, &options).await?.features) })
    }

    fn reverse_lookup(
        &self,
        position: LngLat,
    ) -> LocalBoxFuture<'_, Result<Vec<Place>, GeocodingError>> {
        Box::pin(async move { Ok(self.reverse(position).await?.features) })
    }
}

impl Router for MapboxClient {
    fn directions(
        &self,
        waypoints: Vec<LngLat>,
    ) -> LocalBoxFuture<'_, Result<DirectionsResponse, GeocodingError>> {
        Box::pin(async move { self.route(&waypoints).await })
    }
}
