use std::env;

use crate::error::GeocodingError;

pub const DEFAULT_GEOCODING_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";
pub const DEFAULT_DIRECTIONS_URL: &str = "https://api.mapbox.com/directions/v5/mapbox";
pub const DEFAULT_DIRECTIONS_PROFILE: &str = "driving";
pub const DEFAULT_COUNTRY: &str = "vn";
pub const DEFAULT_LANGUAGE: &str = "es";
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
/// Reverse lookups only ever need the top candidate.
pub const REVERSE_LIMIT: u32 = 1;

pub const ENV_ACCESS_TOKEN: &str = "MAPBOX_ACCESS_TOKEN";
pub const ENV_GEOCODING_URL: &str = "MAPBOX_GEOCODING_URL";
pub const ENV_DIRECTIONS_URL: &str = "MAPBOX_DIRECTIONS_URL";
pub const ENV_DIRECTIONS_PROFILE: &str = "MAPBOX_DIRECTIONS_PROFILE";
pub const ENV_COUNTRY: &str = "PLACES_COUNTRY";
pub const ENV_LANGUAGE: &str = "PLACES_LANGUAGE";
pub const ENV_SEARCH_LIMIT: &str = "PLACES_SEARCH_LIMIT";

/// Endpoints, fixed request parameters and the access token.
///
/// The token is injected at startup; it never lives in source.
#[derive(Clone, PartialEq, Eq)]
pub struct GeocodingConfig {
    pub access_token: String,
    pub geocoding_url: String,
    pub directions_url: String,
    pub directions_profile: String,
    pub country: String,
    pub language: String,
    pub search_limit: u32,
    pub reverse_limit: u32,
}

impl std::fmt::Debug for GeocodingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodingConfig")
            .field("access_token", &"<redacted>")
            .field("geocoding_url", &self.geocoding_url)
            .field("directions_url", &self.directions_url)
            .field("directions_profile", &self.directions_profile)
            .field("country", &self.country)
            .field("language", &self.language)
            .field("search_limit", &self.search_limit)
            .field("reverse_limit", &self.reverse_limit)
            .finish()
    }
}

impl GeocodingConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            directions_url: DEFAULT_DIRECTIONS_URL.to_string(),
            directions_profile: DEFAULT_DIRECTIONS_PROFILE.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            reverse_limit: REVERSE_LIMIT,
        }
    }

    /// Points both geocoding and directions at `base` (a proxy or a test server).
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.geocoding_url = base.to_string();
        self.directions_url = base.to_string();
        self
    }

    pub fn from_env() -> Result<Self, GeocodingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key/value source; `from_env` uses the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, GeocodingError> {
        let access_token = lookup(ENV_ACCESS_TOKEN)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| GeocodingError::Config(format!("{ENV_ACCESS_TOKEN} is not set")))?;

        let mut config = Self::new(access_token);
        if let Some(v) = lookup(ENV_GEOCODING_URL) {
            config.geocoding_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup(ENV_DIRECTIONS_URL) {
            config.directions_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup(ENV_DIRECTIONS_PROFILE) {
            config.directions_profile = v;
        }
        if let Some(v) = lookup(ENV_COUNTRY) {
            config.country = v;
        }
        if let Some(v) = lookup(ENV_LANGUAGE) {
            config.language = v;
        }
        config.search_limit = lookup(ENV_SEARCH_LIMIT)
            .and_then(|v| v.parse().ok())
            .filter(|v| (1..=10).contains(v))
            .unwrap_or(DEFAULT_SEARCH_LIMIT);
        Ok(config)
    }
}
