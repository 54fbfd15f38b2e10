//! Click-to-marker matching.
//!
//! Ordering contract:
//! - The first marker (in tracking order) within the threshold on both axes
//!   wins, even when a later marker is closer.

use foundation::LngLat;

use crate::surface::MarkerId;

/// Threshold in degrees at zoom 0; it halves with every zoom level.
pub const THRESHOLD_AT_ZOOM_ZERO: f64 = 20.0;

/// `20 / 2^zoom` degrees.
pub fn match_threshold(zoom: f64) -> f64 {
    THRESHOLD_AT_ZOOM_ZERO / 2f64.powf(zoom)
}

/// Strictly closer than `threshold` on both axes.
pub fn within_threshold(a: LngLat, b: LngLat, threshold: f64) -> bool {
    let (dlng, dlat) = a.abs_diff(b);
    dlng < threshold && dlat < threshold
}

pub fn find_nearby<I>(markers: I, click: LngLat, zoom: f64) -> Option<MarkerId>
where
    I: IntoIterator<Item = (MarkerId, LngLat)>,
{
    let threshold = match_threshold(zoom);
    markers
        .into_iter()
        .find(|(_, position)| within_threshold(click, *position, threshold))
        .map(|(id, _)| id)
}
