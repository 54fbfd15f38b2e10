use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Geographic position in WGS84 degrees, longitude first.
///
/// Serializes as a `[lng, lat]` array, the order geocoding and map APIs use.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn from_array(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Per-axis absolute difference `(|dlng|, |dlat|)`.
    pub fn abs_diff(self, other: LngLat) -> (f64, f64) {
        ((self.lng - other.lng).abs(), (self.lat - other.lat).abs())
    }

    pub fn is_valid(self) -> bool {
        self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(v: [f64; 2]) -> Self {
        Self::from_array(v)
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(p: LngLat) -> Self {
        p.to_array()
    }
}

impl std::fmt::Display for LngLat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lng, self.lat)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLngLatError(String);

impl std::fmt::Display for ParseLngLatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid coordinate pair: {}", self.0)
    }
}

impl std::error::Error for ParseLngLatError {}

impl FromStr for LngLat {
    type Err = ParseLngLatError;

    /// Parses `lng,lat`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lng, lat) = s
            .split_once(',')
            .ok_or_else(|| ParseLngLatError(s.to_string()))?;
        let lng = lng
            .trim()
            .parse::<f64>()
            .map_err(|_| ParseLngLatError(s.to_string()))?;
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| ParseLngLatError(s.to_string()))?;
        let p = LngLat::new(lng, lat);
        if !p.is_valid() {
            return Err(ParseLngLatError(s.to_string()));
        }
        Ok(p)
    }
}

#[cfg(test)]
mod tests {
    use super::LngLat;

    #[test]
    fn parses_lng_lat_pair() {
        let p: LngLat = "-70.64, -33.45".parse().unwrap();
        assert_eq!(p, LngLat::new(-70.64, -33.45));
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert!("200,0".parse::<LngLat>().is_err());
        assert!("0,91".parse::<LngLat>().is_err());
        assert!("abc".parse::<LngLat>().is_err());
        assert!("1;2".parse::<LngLat>().is_err());
    }

    #[test]
    fn serializes_as_array() {
        let p = LngLat::new(106.7, 10.8);
        assert_eq!(serde_json::to_string(&p).unwrap(), "[106.7,10.8]");
        let back: LngLat = serde_json::from_str("[106.7,10.8]").unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn abs_diff_is_per_axis() {
        let a = LngLat::new(-70.64, -33.45);
        let b = LngLat::new(-70.6401, -33.4502);
        let (dlng, dlat) = a.abs_diff(b);
        assert!((dlng - 0.0001).abs() < 1e-9);
        assert!((dlat - 0.0002).abs() < 1e-9);
    }
}
