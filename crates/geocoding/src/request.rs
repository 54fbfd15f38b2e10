//! Request URL construction, shared by the native and browser clients.

use foundation::{LngLat, LngLatBounds};
pub use reqwest::Url;

use crate::config::GeocodingConfig;
use crate::error::GeocodingError;

/// Upper bound the directions service accepts per request.
pub const MAX_WAYPOINTS: usize = 25;

/// Optional forward-search biasing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchOptions {
    /// Prefer results close to this point (usually the user's location).
    pub proximity: Option<LngLat>,
    /// Restrict results to this box.
    pub bbox: Option<LngLatBounds>,
}

impl SearchOptions {
    pub fn near(proximity: LngLat) -> Self {
        Self {
            proximity: Some(proximity),
            bbox: None,
        }
    }
}

/// `GET {geocoding_url}/{query}.json?country&limit&language[&proximity][&bbox]&access_token`
pub fn search_url(
    config: &GeocodingConfig,
    query: &str,
    options: &SearchOptions,
) -> Result<Url, GeocodingError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(GeocodingError::InvalidInput("empty search query".to_string()));
    }

    let mut url = endpoint(&config.geocoding_url, &[format!("{query}.json").as_str()])?;
    {
        let mut q = url.query_pairs_mut();
        q.append_pair("country", &config.country);
        q.append_pair("limit", &config.search_limit.to_string());
        q.append_pair("language", &config.language);
        if let Some(p) = options.proximity {
            q.append_pair("proximity", &p.to_string());
        }
        if let Some(b) = options.bbox {
            q.append_pair("bbox", &b.to_bbox_param());
        }
        q.append_pair("access_token", &config.access_token);
    }
    Ok(url)
}

/// `GET {geocoding_url}/{lng},{lat}.json?access_token&limit=1`
pub fn reverse_url(config: &GeocodingConfig, position: LngLat) -> Result<Url, GeocodingError> {
    if !position.is_valid() {
        return Err(GeocodingError::InvalidInput(format!(
            "coordinates out of range: {position}"
        )));
    }

    let mut url = endpoint(&config.geocoding_url, &[format!("{position}.json").as_str()])?;
    url.query_pairs_mut()
        .append_pair("access_token", &config.access_token)
        .append_pair("limit", &config.reverse_limit.to_string());
    Ok(url)
}

/// `GET {directions_url}/{profile}/{lng,lat;lng,lat...}` with the fixed route options.
pub fn directions_url(
    config: &GeocodingConfig,
    waypoints: &[LngLat],
) -> Result<Url, GeocodingError> {
    if waypoints.len() < 2 || waypoints.len() > MAX_WAYPOINTS {
        return Err(GeocodingError::InvalidInput(format!(
            "directions need 2..={MAX_WAYPOINTS} waypoints, got {}",
            waypoints.len()
        )));
    }
    if let Some(bad) = waypoints.iter().find(|p| !p.is_valid()) {
        return Err(GeocodingError::InvalidInput(format!(
            "coordinates out of range: {bad}"
        )));
    }

    let coords = waypoints
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(";");
    let mut url = endpoint(
        &config.directions_url,
        &[config.directions_profile.as_str(), coords.as_str()],
    )?;
    url.query_pairs_mut()
        .append_pair("alternatives", "false")
        .append_pair("geometries", "geojson")
        .append_pair("overview", "simplified")
        .append_pair("steps", "false")
        .append_pair("access_token", &config.access_token);
    Ok(url)
}

/// Path of `url` without the query string, safe to log.
pub fn redacted(url: &Url) -> String {
    format!("{}{}", url.origin().ascii_serialization(), url.path())
}

fn endpoint(base: &str, segments: &[&str]) -> Result<Url, GeocodingError> {
    let mut url =
        Url::parse(base).map_err(|e| GeocodingError::Config(format!("invalid url {base}: {e}")))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| GeocodingError::Config(format!("url cannot take a path: {base}")))?;
        path.pop_if_empty();
        for s in segments {
            path.push(s);
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> GeocodingConfig {
        GeocodingConfig::new("pk.test")
    }

    #[test]
    fn search_url_carries_fixed_params_in_order() {
        let url = search_url(&config(), "Santiago", &SearchOptions::default()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.mapbox.com/geocoding/v5/mapbox.places/Santiago.json?country=vn&limit=10&language=es&access_token=pk.test"
        );
    }

    #[test]
    fn search_url_encodes_query_and_options() {
        let opts = SearchOptions {
            proximity: Some(LngLat::new(-70.6, -33.4)),
            bbox: Some(LngLatBounds::new(
                LngLat::new(-71.0, -34.0),
                LngLat::new(-70.0, -33.0),
            )),
        };
        let url = search_url(&config(), " Plaza de Armas/centro ", &opts).unwrap();
        assert_eq!(
            url.path(),
            "/geocoding/v5/mapbox.places/Plaza%20de%20Armas%2Fcentro.json"
        );
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("proximity".to_string(), "-70.6,-33.4".to_string())));
        assert!(pairs.contains(&("bbox".to_string(), "-71,-34,-70,-33".to_string())));
    }

    #[test]
    fn empty_query_is_rejected() {
        let err = search_url(&config(), "   ", &SearchOptions::default()).unwrap_err();
        assert!(matches!(err, GeocodingError::InvalidInput(_)));
    }

    #[test]
    fn reverse_url_is_lng_first_with_limit_one() {
        let url = reverse_url(&config(), LngLat::new(-70.64, -33.45)).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.mapbox.com/geocoding/v5/mapbox.places/-70.64,-33.45.json?access_token=pk.test&limit=1"
        );
    }

    #[test]
    fn directions_url_joins_waypoints() {
        let url = directions_url(
            &config(),
            &[LngLat::new(-70.64, -33.45), LngLat::new(-70.65, -33.44)],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.mapbox.com/directions/v5/mapbox/driving/-70.64,-33.45;-70.65,-33.44?alternatives=false&geometries=geojson&overview=simplified&steps=false&access_token=pk.test"
        );
    }

    #[test]
    fn directions_needs_two_waypoints() {
        let err = directions_url(&config(), &[LngLat::new(0.0, 0.0)]).unwrap_err();
        assert!(matches!(err, GeocodingError::InvalidInput(_)));
    }

    #[test]
    fn base_url_with_trailing_slash_and_redaction() {
        let cfg = config().with_base_url("http://127.0.0.1:9200/places/");
        let url = reverse_url(&cfg, LngLat::new(1.5, 2.5)).unwrap();
        assert_eq!(url.path(), "/places/1.5,2.5.json");
        assert_eq!(redacted(&url), "http://127.0.0.1:9200/places/1.5,2.5.json");
    }
}
