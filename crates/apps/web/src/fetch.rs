use foundation::LngLat;
use geocoding::request::{self, SearchOptions};
use geocoding::{
    DirectionsResponse, Geocoder, GeocodingConfig, GeocodingError, LocalBoxFuture, Place,
    PlacesResponse, Router,
};
use gloo_net::http::Request;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsValue;

/// Browser-side geocoder: same URLs as the native client, fetched with gloo-net.
#[derive(Debug, Clone)]
pub struct FetchGeocoder {
    config: GeocodingConfig,
}

impl FetchGeocoder {
    pub fn new(config: GeocodingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeocodingConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: request::Url,
        what: &str,
    ) -> Result<T, GeocodingError> {
        let target = request::redacted(&url);
        let result = fetch_json(url.as_str()).await;
        if let Err(err) = &result {
            web_sys::console::error_1(&JsValue::from_str(&format!(
                "{what} request to {target} failed: {err}"
            )));
        }
        result
    }
}

async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, GeocodingError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| GeocodingError::Transport(e.to_string()))?;

    if !resp.ok() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(GeocodingError::Status {
            status,
            body: body.trim().to_string(),
        });
    }

    let text = resp
        .text()
        .await
        .map_err(|e| GeocodingError::Transport(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| GeocodingError::Decode(e.to_string()))
}

impl Geocoder for FetchGeocoder {
    fn search(
        &self,
        query: String,
        options: SearchOptions,
    ) -> LocalBoxFuture<'_, Result<Vec<Place>, GeocodingError>> {
        Box::pin(async move {
            let url = request::search_url(&self.config, &query, &options)?;
            let resp: PlacesResponse = self.get_json(url, "search").await?;
            Ok(resp.features)
        })
    }

    fn reverse_lookup(
        &self,
        position: LngLat,
    ) -> LocalBoxFuture<'_, Result<Vec<Place>, GeocodingError>> {
        Box::pin(async move {
            let url = request::reverse_url(&self.config, position)?;
            let resp: PlacesResponse = self.get_json(url, "reverse lookup").await?;
            Ok(resp.features)
        })
    }
}

impl Router for FetchGeocoder {
    fn directions(
        &self,
        waypoints: Vec<LngLat>,
    ) -> LocalBoxFuture<'_, Result<DirectionsResponse, GeocodingError>> {
        Box::pin(async move {
            let url = request::directions_url(&self.config, &waypoints)?;
            let resp: DirectionsResponse = self.get_json(url, "directions").await?;
            if !resp.is_ok() {
                return Err(GeocodingError::Rejected(resp.code));
            }
            Ok(resp)
        })
    }
}
