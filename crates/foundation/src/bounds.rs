use serde::{Deserialize, Serialize};

use crate::lnglat::LngLat;

/// Axis-aligned geographic box (south-west `min`, north-east `max`).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LngLatBounds {
    pub min: LngLat,
    pub max: LngLat,
}

impl LngLatBounds {
    pub fn new(min: LngLat, max: LngLat) -> Self {
        LngLatBounds { min, max }
    }

    pub fn contains(&self, p: LngLat) -> bool {
        p.lng >= self.min.lng
            && p.lng <= self.max.lng
            && p.lat >= self.min.lat
            && p.lat <= self.max.lat
    }

    /// `minLng,minLat,maxLng,maxLat`, the `bbox` query parameter format.
    pub fn to_bbox_param(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min.lng, self.min.lat, self.max.lng, self.max.lat
        )
    }
}
