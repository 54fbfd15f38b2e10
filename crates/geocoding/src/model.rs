//! Wire types of the geocoding and directions services.
//!
//! Shapes follow the Mapbox `mapbox.places` and `directions/v5` JSON. Localized
//! keys (`text_es`, `place_name_es`, `language_es`, ...) are kept in a flattened
//! map so any configured language round-trips.

use std::collections::BTreeMap;

use foundation::LngLat;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A ranked place candidate (a GeoJSON feature). Immutable once received;
/// the `with_*` builders return modified copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    #[serde(rename = "type", default = "feature_kind")]
    pub kind: String,
    #[serde(default)]
    pub place_type: Vec<String>,
    #[serde(default)]
    pub relevance: f64,
    #[serde(default)]
    pub properties: PlaceProperties,
    pub text: String,
    #[serde(default)]
    pub place_name: String,
    pub center: LngLat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<PointGeometry>,
    #[serde(default)]
    pub context: Vec<PlaceContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_place_name: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn feature_kind() -> String {
    "Feature".to_string()
}

impl Place {
    pub fn new(id: impl Into<String>, text: impl Into<String>, center: LngLat) -> Self {
        let text = text.into();
        Self {
            id: id.into(),
            kind: feature_kind(),
            place_type: Vec::new(),
            relevance: 1.0,
            properties: PlaceProperties::default(),
            place_name: text.clone(),
            text,
            center,
            geometry: Some(PointGeometry::new(center)),
            context: Vec::new(),
            matching_text: None,
            matching_place_name: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn center(&self) -> LngLat {
        self.center
    }

    /// `text_{lang}` if the service localized it, the default text otherwise.
    pub fn localized_text(&self, lang: &str) -> &str {
        localized(&self.extra, "text", lang).unwrap_or(&self.text)
    }

    /// `place_name_{lang}` if present, the default place name otherwise.
    pub fn localized_place_name(&self, lang: &str) -> &str {
        localized(&self.extra, "place_name", lang).unwrap_or(&self.place_name)
    }

    /// Display text of the context entry at `index` (0 = innermost region).
    pub fn context_text(&self, index: usize) -> Option<&str> {
        self.context.get(index).map(|c| c.text.as_str())
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_center(mut self, center: LngLat) -> Self {
        self.center = center;
        if let Some(g) = self.geometry.as_mut() {
            g.coordinates = center;
        }
        self
    }

    pub fn with_place_name(mut self, place_name: impl Into<String>) -> Self {
        self.place_name = place_name.into();
        self
    }

    pub fn with_localized_text(mut self, lang: &str, text: impl Into<String>) -> Self {
        self.extra
            .insert(format!("text_{lang}"), Value::String(text.into()));
        self
    }

    /// Appends context entries innermost first; ids are synthesized as `region.{n}`.
    pub fn with_context<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let start = self.context.len();
        self.context.extend(
            texts
                .into_iter()
                .enumerate()
                .map(|(i, t)| PlaceContext::new(format!("region.{}", start + i), t)),
        );
        self
    }

    pub fn same_center(&self, other: &Place) -> bool {
        self.center.lng == other.center.lng && self.center.lat == other.center.lat
    }
}

fn localized<'a>(extra: &'a BTreeMap<String, Value>, key: &str, lang: &str) -> Option<&'a str> {
    extra
        .get(&format!("{key}_{lang}"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wikidata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_code: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A containing administrative region (neighborhood, locality, region, country...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceContext {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wikidata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_code: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PlaceContext {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            wikidata: None,
            short_code: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn localized_text(&self, lang: &str) -> &str {
        localized(&self.extra, "text", lang).unwrap_or(&self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: GeometryKind,
    pub coordinates: LngLat,
}

impl PointGeometry {
    pub fn new(coordinates: LngLat) -> Self {
        Self {
            kind: GeometryKind::Point,
            coordinates,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    #[serde(rename = "type")]
    pub kind: GeometryKind,
    pub coordinates: Vec<LngLat>,
}

/// Response of both forward search and reverse lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacesResponse {
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Search terms for forward search, `[lng, lat]` numbers for reverse lookup.
    #[serde(default)]
    pub query: Vec<Value>,
    #[serde(default)]
    pub features: Vec<Place>,
    #[serde(default)]
    pub attribution: String,
}

/// Compact summary of a selected place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub name: String,
    pub coordinates: LngLat,
}

impl From<&Place> for PlaceDetails {
    fn from(place: &Place) -> Self {
        Self {
            name: place.text.clone(),
            coordinates: place.center,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsResponse {
    pub code: String,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

impl DirectionsResponse {
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
    pub geometry: LineString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(default)]
    pub name: String,
    pub location: LngLat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}
