use foundation::{Arena, LngLat};

use crate::popup::Popup;
use crate::surface::{MarkerColor, MarkerId, MarkerSpec, RenderSurface};

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessMarker {
    pub position: LngLat,
    pub color: MarkerColor,
    pub popup: Option<Popup>,
    pub popup_open: bool,
}

/// In-memory render surface: no drawing, flights land instantly.
///
/// Used by tests and by the command-line simulation.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    center: LngLat,
    zoom: f64,
    markers: Arena<HeadlessMarker>,
    flights: Vec<LngLat>,
}

impl HeadlessSurface {
    pub fn new(center: LngLat, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            markers: Arena::new(),
            flights: Vec::new(),
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    pub fn marker(&self, marker: MarkerId) -> Option<&HeadlessMarker> {
        self.markers.get(marker.0)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Live markers in slot order.
    pub fn markers(&self) -> impl Iterator<Item = (MarkerId, &HeadlessMarker)> + '_ {
        self.markers.iter().map(|(h, m)| (MarkerId(h), m))
    }

    pub fn open_markers(&self) -> Vec<MarkerId> {
        self.markers()
            .filter(|(_, m)| m.popup_open)
            .map(|(id, _)| id)
            .collect()
    }

    /// Every `fly_to` target, oldest first.
    pub fn flights(&self) -> &[LngLat] {
        &self.flights
    }
}

impl RenderSurface for HeadlessSurface {
    fn center(&self) -> LngLat {
        self.center
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerId {
        MarkerId(self.markers.insert(HeadlessMarker {
            position: spec.position,
            color: spec.color,
            popup: spec.popup,
            popup_open: false,
        }))
    }

    fn remove_marker(&mut self, marker: MarkerId) -> bool {
        self.markers.remove(marker.0).is_some()
    }

    fn marker_position(&self, marker: MarkerId) -> Option<LngLat> {
        self.markers.get(marker.0).map(|m| m.position)
    }

    fn set_popup(&mut self, marker: MarkerId, popup: Popup) -> bool {
        let Some(m) = self.markers.get_mut(marker.0) else {
            return false;
        };
        m.popup = Some(popup);
        true
    }

    fn open_popup(&mut self, marker: MarkerId) -> bool {
        match self.markers.get_mut(marker.0) {
            Some(m) if m.popup.is_some() => {
                m.popup_open = true;
                true
            }
            _ => false,
        }
    }

    fn close_popup(&mut self, marker: MarkerId) -> bool {
        let Some(m) = self.markers.get_mut(marker.0) else {
            return false;
        };
        m.popup_open = false;
        true
    }

    fn is_popup_open(&self, marker: MarkerId) -> bool {
        self.markers.get(marker.0).is_some_and(|m| m.popup_open)
    }

    fn fly_to(&mut self, center: LngLat) {
        self.center = center;
        self.flights.push(center);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_needs_content_to_open() {
        let mut s = HeadlessSurface::new(LngLat::new(0.0, 0.0), 10.0);
        let bare = s.add_marker(MarkerSpec::new(LngLat::new(1.0, 1.0)));
        assert!(!s.open_popup(bare));

        assert!(s.set_popup(bare, Popup::new("t", "b")));
        assert!(s.open_popup(bare));
        assert_eq!(s.open_markers(), vec![bare]);
        assert!(s.close_popup(bare));
        assert!(s.open_markers().is_empty());
    }

    #[test]
    fn removed_marker_is_gone() {
        let mut s = HeadlessSurface::new(LngLat::new(0.0, 0.0), 10.0);
        let m = s.add_marker(MarkerSpec::new(LngLat::new(1.0, 1.0)));
        assert!(s.remove_marker(m));
        assert!(!s.remove_marker(m));
        assert_eq!(s.marker_position(m), None);
        assert_eq!(s.marker_count(), 0);
    }

    #[test]
    fn fly_to_moves_center() {
        let mut s = HeadlessSurface::new(LngLat::new(0.0, 0.0), 10.0);
        s.fly_to(LngLat::new(3.0, 4.0));
        assert_eq!(s.center(), LngLat::new(3.0, 4.0));
        assert_eq!(s.flights(), &[LngLat::new(3.0, 4.0)]);
    }
}
