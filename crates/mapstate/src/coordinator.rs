//! Map state: marker lifecycle, click resolution and the selected-places list.
//!
//! The coordinator owns its state explicitly (no globals), so several maps can
//! coexist. It never owns map objects; markers are released through the
//! surface.

use foundation::LngLat;
use geocoding::config::DEFAULT_LANGUAGE;
use geocoding::{Geocoder, Place};
use tracing::{debug, error, warn};

use crate::error::MapStateError;
use crate::popup::Popup;
use crate::proximity;
use crate::selection::SelectedPlaces;
use crate::surface::{MarkerColor, MarkerId, MarkerSpec, RenderSurface};

/// A click on the map surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MapClick {
    pub position: LngLat,
}

impl MapClick {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self {
            position: LngLat::new(lng, lat),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClickResolution {
    /// The click landed on an already tracked marker.
    Matched(MarkerId),
    /// A new ad-hoc marker was placed at the click.
    Created(MarkerId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClickOutcome {
    pub resolution: ClickResolution,
    /// Candidate the popup's "Add" button appends.
    pub place: Place,
    pub popup: Popup,
}

impl ClickOutcome {
    pub fn marker(&self) -> MarkerId {
        match self.resolution {
            ClickResolution::Matched(id) | ClickResolution::Created(id) => id,
        }
    }
}

/// A marker backed by a search result or a list entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedMarker {
    pub id: MarkerId,
    pub place: Place,
}

#[derive(Debug)]
pub struct MapCoordinator<S: RenderSurface> {
    surface: Option<S>,
    language: String,
    location_marker: Option<MarkerId>,
    markers: Vec<TrackedMarker>,
    selected: SelectedPlaces,
    /// Marker placed by the last unmatched click.
    ad_hoc: Option<MarkerId>,
    /// Marker whose popup the coordinator opened last.
    open: Option<MarkerId>,
    pending: Option<Place>,
    allow_click: bool,
}

impl<S: RenderSurface> Default for MapCoordinator<S> {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl<S: RenderSurface> MapCoordinator<S> {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            surface: None,
            language: language.into(),
            location_marker: None,
            markers: Vec::new(),
            selected: SelectedPlaces::new(),
            ad_hoc: None,
            open: None,
            pending: None,
            allow_click: true,
        }
    }

    /// Takes the map handle, drops a red marker at its current center and
    /// marks the state ready.
    ///
    /// Markers placed on a previous surface are removed from it first; that
    /// surface is handed back.
    pub fn set_map(&mut self, mut surface: S) -> Option<S> {
        let previous = self.release_surface();

        let center = surface.center();
        let location = surface.add_marker(MarkerSpec::new(center).with_color(MarkerColor::Red));
        debug!("map ready at {center}");

        self.location_marker = Some(location);
        self.surface = Some(surface);
        previous
    }

    fn release_surface(&mut self) -> Option<S> {
        let mut old = self.surface.take();
        let owned: Vec<MarkerId> = self
            .markers
            .drain(..)
            .map(|m| m.id)
            .chain(self.ad_hoc.take())
            .chain(self.location_marker.take())
            .collect();
        if let Some(surface) = old.as_mut() {
            let removed = owned
                .into_iter()
                .filter(|&id| surface.remove_marker(id))
                .count();
            debug!("released {removed} markers from the previous map");
        }
        self.open = None;
        self.pending = None;
        old
    }

    pub fn is_map_ready(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn location_marker(&self) -> Option<MarkerId> {
        self.location_marker
    }

    pub fn markers(&self) -> &[TrackedMarker] {
        &self.markers
    }

    pub fn selected(&self) -> &SelectedPlaces {
        &self.selected
    }

    pub fn ad_hoc_marker(&self) -> Option<MarkerId> {
        self.ad_hoc
    }

    pub fn open_marker(&self) -> Option<MarkerId> {
        self.open
    }

    /// Candidate of the most recent click popup.
    pub fn pending(&self) -> Option<&Place> {
        self.pending.as_ref()
    }

    pub fn is_click_allowed(&self) -> bool {
        self.allow_click
    }

    /// One popup marker per search result, in response order. The previous
    /// tracked markers are removed once the new ones are on the map.
    pub fn show_search_results(&mut self, places: &[Place]) -> Result<(), MapStateError> {
        let surface = self.surface.as_mut().ok_or(MapStateError::MapNotReady)?;

        let fresh: Vec<TrackedMarker> = places
            .iter()
            .map(|place| {
                let popup = Popup::for_search_result(place, &self.language);
                let id = surface.add_marker(MarkerSpec::new(place.center()).with_popup(popup));
                TrackedMarker {
                    id,
                    place: place.clone(),
                }
            })
            .collect();

        for old in self.markers.drain(..) {
            surface.remove_marker(old.id);
            if self.open == Some(old.id) {
                self.open = None;
                self.pending = None;
            }
        }
        debug!("showing {} search results", fresh.len());
        self.markers = fresh;
        Ok(())
    }

    /// Replaces the tracked markers with one gray marker per list entry and
    /// adopts `places` as the selected-places list.
    pub fn update_list_places(&mut self, places: Vec<Place>) -> Result<(), MapStateError> {
        let surface = self.surface.as_mut().ok_or(MapStateError::MapNotReady)?;

        for old in self.markers.drain(..) {
            surface.remove_marker(old.id);
            if self.open == Some(old.id) {
                self.open = None;
                self.pending = None;
            }
        }
        self.markers = places
            .iter()
            .map(|place| TrackedMarker {
                id: surface.add_marker(
                    MarkerSpec::new(place.center()).with_color(MarkerColor::Gray),
                ),
                place: place.clone(),
            })
            .collect();
        self.selected.replace(places);
        Ok(())
    }

    /// Enables or disables click-to-lookup. Disabling removes the ad-hoc marker.
    pub fn update_allow_click(&mut self, enabled: bool) {
        self.allow_click = enabled;
        if enabled {
            return;
        }
        if let Some(prev) = self.ad_hoc.take() {
            if let Some(surface) = self.surface.as_mut() {
                surface.remove_marker(prev);
            }
            if self.open == Some(prev) {
                self.open = None;
            }
            self.pending = None;
        }
    }

    pub fn fly_to(&mut self, lng: f64, lat: f64) {
        match self.surface.as_mut() {
            Some(surface) => surface.fly_to(LngLat::new(lng, lat)),
            None => debug!("fly_to ignored: map not ready"),
        }
    }

    /// Reverse-looks-up the clicked point and resolves it.
    ///
    /// Returns `Ok(None)` while clicks are disabled, before the lookup or when
    /// it resolves. Lookup failures are logged and returned; nothing changes
    /// on the map.
    pub async fn handle_click<G>(
        &mut self,
        geocoder: &G,
        click: MapClick,
    ) -> Result<Option<ClickOutcome>, MapStateError>
    where
        G: Geocoder + ?Sized,
    {
        if !self.allow_click {
            return Ok(None);
        }
        if self.surface.is_none() {
            return Err(MapStateError::MapNotReady);
        }

        let places = match geocoder.reverse_lookup(click.position).await {
            Ok(places) => places,
            Err(err) => {
                error!("error in reverse lookup at {}: {err}", click.position);
                return Err(MapStateError::Lookup(err));
            }
        };
        self.apply_reverse_lookup(click, places)
    }

    /// Resolves a click against the lookup result.
    ///
    /// Within `20 / 2^zoom` degrees of a tracked marker (zoom read now), that
    /// marker's popup opens with the top candidate and the view flies to the
    /// candidate. Otherwise a new ad-hoc marker replaces the previous one.
    /// Lookups may resolve out of click order; each is applied as it arrives.
    /// A result arriving while clicks are disabled is dropped (`Ok(None)`).
    pub fn apply_reverse_lookup(
        &mut self,
        click: MapClick,
        candidates: Vec<Place>,
    ) -> Result<Option<ClickOutcome>, MapStateError> {
        if !self.allow_click {
            debug!("dropped lookup for {}: clicks disabled", click.position);
            return Ok(None);
        }
        let surface = self.surface.as_mut().ok_or(MapStateError::MapNotReady)?;
        let top = candidates
            .into_iter()
            .next()
            .ok_or(MapStateError::NoCandidates {
                position: click.position,
            })?;

        let zoom = surface.zoom();
        let nearby = proximity::find_nearby(
            self.markers
                .iter()
                .filter_map(|m| surface.marker_position(m.id).map(|p| (m.id, p))),
            click.position,
            zoom,
        );

        let outcome = match nearby {
            Some(marker) => {
                let popup = Popup::for_lookup(top.text.clone(), &top);
                if let Some(open) = self.open.filter(|&open| open != marker) {
                    surface.close_popup(open);
                }
                surface.set_popup(marker, popup.clone());
                surface.open_popup(marker);
                if let Some(prev) = self.ad_hoc.take() {
                    surface.remove_marker(prev);
                }
                surface.fly_to(top.center());
                debug!("click at {} matched marker {}", click.position, marker.0);
                ClickOutcome {
                    resolution: ClickResolution::Matched(marker),
                    place: top,
                    popup,
                }
            }
            None => {
                let name = self.selected.next_ad_hoc_name();
                let place = top.with_text(name.clone()).with_center(click.position);
                let popup = Popup::for_lookup(name, &place);
                if let Some(open) = self.open {
                    surface.close_popup(open);
                }
                let marker =
                    surface.add_marker(MarkerSpec::new(click.position).with_popup(popup.clone()));
                surface.open_popup(marker);
                if let Some(prev) = self.ad_hoc.replace(marker) {
                    surface.remove_marker(prev);
                }
                debug!("click at {} created {:?}", click.position, place.text);
                ClickOutcome {
                    resolution: ClickResolution::Created(marker),
                    place,
                    popup,
                }
            }
        };

        self.open = Some(outcome.marker());
        self.pending = Some(outcome.place.clone());
        Ok(Some(outcome))
    }

    /// Appends `place` unless its center equals the last entry's center.
    pub fn add_place(&mut self, place: Place) -> bool {
        let text = place.text.clone();
        let added = self.selected.add(place);
        if added {
            debug!("added {text:?} ({} selected)", self.selected.len());
        } else {
            warn!("ignored duplicate of last selected place: {text:?}");
        }
        added
    }

    /// "Add" button of the latest click popup.
    pub fn activate_add(&mut self) -> bool {
        match self.pending.clone() {
            Some(place) => self.add_place(place),
            None => false,
        }
    }

    /// "Add" button pressed inside `marker`'s popup. The popup the coordinator
    /// opened last adds the pending candidate; a search popup adds its result.
    pub fn add_from_popup(&mut self, marker: MarkerId) -> bool {
        if self.open == Some(marker) && self.pending.is_some() {
            return self.activate_add();
        }
        let tracked = self
            .markers
            .iter()
            .find(|m| m.id == marker)
            .map(|m| m.place.clone());
        match tracked {
            Some(place) => self.add_place(place),
            None => {
                warn!("add pressed on unknown marker {}", marker.0);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use geocoding::{GeocodingError, MemoryGeocoder};
    use pollster::block_on;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::headless::HeadlessSurface;

    fn lookup_place(center: LngLat) -> Place {
        Place::new("address.9", "Alameda", center).with_context([
            "Barrio Civico",
            "8320000",
            "Santiago",
            "Santiago Province",
            "Santiago Metropolitan",
            "Chile",
        ])
    }

    fn ready(zoom: f64) -> MapCoordinator<HeadlessSurface> {
        let mut c = MapCoordinator::default();
        c.set_map(HeadlessSurface::new(LngLat::new(-70.6, -33.4), zoom));
        c
    }

    fn surface(c: &MapCoordinator<HeadlessSurface>) -> &HeadlessSurface {
        c.surface().unwrap()
    }

    fn resolve(c: &mut MapCoordinator<HeadlessSurface>, click: MapClick, top: Place) -> ClickOutcome {
        c.apply_reverse_lookup(click, vec![top])
            .unwrap()
            .expect("clicks are enabled")
    }

    #[test]
    fn set_map_places_red_location_marker() {
        let c = ready(12.0);
        assert!(c.is_map_ready());
        let s = surface(&c);
        assert_eq!(s.marker_count(), 1);
        let m = s.marker(c.location_marker().unwrap()).unwrap();
        assert_eq!(m.color, MarkerColor::Red);
        assert_eq!(m.position, LngLat::new(-70.6, -33.4));
    }

    #[test]
    fn replacing_the_map_releases_markers_from_the_old_one() {
        let mut c = ready(12.0);
        c.show_search_results(&[
            Place::new("place.1", "Santiago", LngLat::new(-70.65, -33.44)),
            Place::new("place.2", "Santiago Centro", LngLat::new(-70.66, -33.45)),
        ])
        .unwrap();
        resolve(&mut c, MapClick::new(1.0, 1.0), lookup_place(LngLat::new(0.0, 0.0)));
        assert_eq!(surface(&c).marker_count(), 4);

        let old = c
            .set_map(HeadlessSurface::new(LngLat::new(10.0, 20.0), 8.0))
            .expect("first surface handed back");
        assert_eq!(old.marker_count(), 0);

        let s = surface(&c);
        assert_eq!(s.marker_count(), 1);
        assert_eq!(
            s.marker(c.location_marker().unwrap()).unwrap().position,
            LngLat::new(10.0, 20.0)
        );
        assert!(c.markers().is_empty());
        assert_eq!(c.ad_hoc_marker(), None);
        assert_eq!(c.pending(), None);
        assert!(!c.activate_add());
    }

    #[test]
    fn first_set_map_has_nothing_to_hand_back() {
        let mut c: MapCoordinator<HeadlessSurface> = MapCoordinator::default();
        assert!(c.set_map(HeadlessSurface::new(LngLat::new(0.0, 0.0), 3.0)).is_none());
        assert_eq!(c.language(), "es");
    }

    #[test]
    fn operations_before_set_map() {
        let mut c: MapCoordinator<HeadlessSurface> = MapCoordinator::default();
        assert_eq!(c.show_search_results(&[]), Err(MapStateError::MapNotReady));
        assert_eq!(c.update_list_places(vec![]), Err(MapStateError::MapNotReady));
        c.fly_to(1.0, 2.0);
        let g = MemoryGeocoder::new();
        let got = block_on(c.handle_click(&g, MapClick::new(0.0, 0.0)));
        assert_eq!(got, Err(MapStateError::MapNotReady));
        assert!(g.calls().is_empty());
    }

    #[test]
    fn search_results_replace_markers_in_order() {
        let mut c = ready(12.0);
        c.show_search_results(&[Place::new("old", "Old", LngLat::new(1.0, 1.0))])
            .unwrap();
        let old_id = c.markers()[0].id;

        let results = vec![
            Place::new("place.1", "Santiago", LngLat::new(-70.65, -33.44)),
            Place::new("place.2", "Santiago de Compostela", LngLat::new(-8.54, 42.88)),
            Place::new("place.3", "Santiago de Cuba", LngLat::new(-75.82, 20.02)),
        ];
        c.show_search_results(&results).unwrap();

        let ids: Vec<&str> = c.markers().iter().map(|m| m.place.id.as_str()).collect();
        assert_eq!(ids, vec!["place.1", "place.2", "place.3"]);
        let s = surface(&c);
        assert!(s.marker(old_id).is_none());
        // three results plus the location marker
        assert_eq!(s.marker_count(), 4);
        for (tracked, place) in c.markers().iter().zip(&results) {
            let m = s.marker(tracked.id).unwrap();
            assert_eq!(m.position, place.center());
            assert_eq!(m.popup.as_ref().unwrap().title, place.text);
        }
    }

    #[test]
    fn list_places_become_gray_markers_and_selection() {
        let mut c = ready(12.0);
        let list = vec![
            Place::new("a", "A", LngLat::new(1.0, 1.0)),
            Place::new("b", "B", LngLat::new(2.0, 2.0)),
        ];
        c.update_list_places(list.clone()).unwrap();
        assert_eq!(c.markers().len(), 2);
        assert_eq!(c.selected().as_slice(), list.as_slice());
        let s = surface(&c);
        assert!(c
            .markers()
            .iter()
            .all(|m| s.marker(m.id).unwrap().color == MarkerColor::Gray));
    }

    #[test]
    fn click_near_existing_marker_opens_its_popup() {
        let mut c = ready(12.0);
        c.show_search_results(&[Place::new("place.1", "Santiago", LngLat::new(-70.6401, -33.4501))])
            .unwrap();
        let existing = c.markers()[0].id;
        let before = surface(&c).marker_count();

        let g = MemoryGeocoder::new();
        let click = MapClick::new(-70.64, -33.45);
        let top = lookup_place(LngLat::new(-70.6402, -33.4503));
        g.set_reverse_results(click.position, vec![top.clone()]);

        let outcome = block_on(c.handle_click(&g, click)).unwrap().unwrap();
        assert_eq!(outcome.resolution, ClickResolution::Matched(existing));
        assert_eq!(outcome.place, top);
        assert_eq!(outcome.popup.title, "Alameda");
        assert_eq!(
            outcome.popup.body,
            "Barrio Civico, Santiago, Santiago Province, Santiago Metropolitan"
        );

        let s = surface(&c);
        assert_eq!(s.marker_count(), before);
        assert_eq!(s.open_markers(), vec![existing]);
        assert_eq!(s.flights(), &[top.center()]);
        assert_eq!(c.ad_hoc_marker(), None);
        assert_eq!(g.calls(), vec!["reverse:-70.64,-33.45"]);
    }

    #[test]
    fn match_removes_previous_ad_hoc_and_keeps_one_open() {
        let mut c = ready(12.0);
        c.show_search_results(&[Place::new("place.1", "Santiago", LngLat::new(-70.6401, -33.4501))])
            .unwrap();
        let existing = c.markers()[0].id;

        let far = resolve(&mut c, MapClick::new(-71.0, -34.0), lookup_place(LngLat::new(-71.0, -34.0)));
        let ad_hoc = far.marker();
        assert_eq!(c.ad_hoc_marker(), Some(ad_hoc));

        resolve(&mut c, MapClick::new(-70.64, -33.45), lookup_place(LngLat::new(-70.64, -33.45)));
        let s = surface(&c);
        assert!(s.marker(ad_hoc).is_none());
        assert_eq!(s.open_markers(), vec![existing]);
        assert_eq!(c.ad_hoc_marker(), None);
    }

    #[test]
    fn unmatched_clicks_create_named_ad_hoc_markers() {
        let mut c = ready(12.0);
        let g = MemoryGeocoder::new();
        g.set_default_reverse(vec![lookup_place(LngLat::new(-70.0, -33.0))]);

        let first = block_on(c.handle_click(&g, MapClick::new(-70.64, -33.45)))
            .unwrap()
            .unwrap();
        assert!(matches!(first.resolution, ClickResolution::Created(_)));
        assert_eq!(first.place.text, "New Marker");
        assert_eq!(first.place.center(), LngLat::new(-70.64, -33.45));
        assert_eq!(first.popup.title, "New Marker");
        assert!(c.activate_add());

        let second = block_on(c.handle_click(&g, MapClick::new(-70.7, -33.5)))
            .unwrap()
            .unwrap();
        assert_eq!(second.place.text, "New Marker 2");

        let s = surface(&c);
        assert!(s.marker(first.marker()).is_none());
        assert_eq!(s.open_markers(), vec![second.marker()]);
        assert_eq!(
            s.marker(second.marker()).unwrap().position,
            LngLat::new(-70.7, -33.5)
        );
        assert_eq!(c.ad_hoc_marker(), Some(second.marker()));
    }

    #[test]
    fn unadded_ad_hoc_does_not_advance_the_counter() {
        let mut c = ready(12.0);
        let p = lookup_place(LngLat::new(0.0, 0.0));
        let a = resolve(&mut c, MapClick::new(1.0, 1.0), p.clone());
        let b = resolve(&mut c, MapClick::new(2.0, 2.0), p);
        assert_eq!(a.place.text, "New Marker");
        assert_eq!(b.place.text, "New Marker");
    }

    #[test]
    fn zoom_is_read_when_the_lookup_resolves() {
        let mut c = ready(12.0);
        c.show_search_results(&[Place::new("p", "P", LngLat::new(-70.641, -33.451))])
            .unwrap();
        c.surface_mut().unwrap().set_zoom(15.0);
        let outcome = resolve(&mut c, MapClick::new(-70.64, -33.45), lookup_place(LngLat::new(0.0, 0.0)));
        assert!(matches!(outcome.resolution, ClickResolution::Created(_)));
    }

    #[test]
    fn replaced_search_markers_take_their_pending_candidate_along() {
        let mut c = ready(12.0);
        c.show_search_results(&[Place::new("place.1", "Santiago", LngLat::new(-70.6401, -33.4501))])
            .unwrap();
        let matched = resolve(
            &mut c,
            MapClick::new(-70.64, -33.45),
            lookup_place(LngLat::new(-70.64, -33.45)),
        );
        assert!(matches!(matched.resolution, ClickResolution::Matched(_)));
        assert!(c.pending().is_some());

        c.show_search_results(&[Place::new("place.9", "Valparaiso", LngLat::new(-71.6, -33.0))])
            .unwrap();
        assert!(surface(&c).marker(matched.marker()).is_none());
        assert_eq!(c.open_marker(), None);
        assert_eq!(c.pending(), None);
        assert!(!c.activate_add());
        assert!(c.selected().is_empty());
    }

    #[test]
    fn replaced_list_markers_take_their_pending_candidate_along() {
        let mut c = ready(12.0);
        c.update_list_places(vec![Place::new("a", "A", LngLat::new(-70.6401, -33.4501))])
            .unwrap();
        resolve(
            &mut c,
            MapClick::new(-70.64, -33.45),
            lookup_place(LngLat::new(-70.64, -33.45)),
        );
        assert!(c.pending().is_some());

        c.update_list_places(vec![]).unwrap();
        assert_eq!(c.pending(), None);
        assert!(!c.activate_add());
    }

    #[test]
    fn ad_hoc_pending_survives_unrelated_marker_replacement() {
        let mut c = ready(12.0);
        let created = resolve(&mut c, MapClick::new(1.0, 1.0), lookup_place(LngLat::new(0.0, 0.0)));
        c.show_search_results(&[Place::new("place.1", "Santiago", LngLat::new(-70.65, -33.44))])
            .unwrap();
        assert_eq!(c.open_marker(), Some(created.marker()));
        assert!(c.activate_add());
    }

    #[test]
    fn lookups_applied_out_of_click_order_leave_one_ad_hoc_marker() {
        let mut c = ready(12.0);
        let click_a = MapClick::new(-70.64, -33.45);
        let click_b = MapClick::new(-70.70, -33.50);

        let from_b = resolve(&mut c, click_b, lookup_place(LngLat::new(0.0, 0.0)));
        let from_a = resolve(&mut c, click_a, lookup_place(LngLat::new(0.0, 0.0)));

        let s = surface(&c);
        assert!(s.marker(from_b.marker()).is_none());
        assert_eq!(c.ad_hoc_marker(), Some(from_a.marker()));
        assert_eq!(s.marker(from_a.marker()).unwrap().position, click_a.position);
        assert_eq!(s.open_markers(), vec![from_a.marker()]);
        // location marker plus the single ad-hoc marker
        assert_eq!(s.marker_count(), 2);
        assert_eq!(c.pending().unwrap().center(), click_a.position);
    }

    #[test]
    fn lookup_resolving_after_clicks_were_disabled_is_dropped() {
        let mut c = ready(12.0);
        let click = MapClick::new(-70.64, -33.45);
        let g = MemoryGeocoder::new();
        g.set_default_reverse(vec![lookup_place(LngLat::new(0.0, 0.0))]);

        // lookup issued while enabled, answer arrives after disabling
        let candidates = block_on(g.reverse_lookup(click.position)).unwrap();
        c.update_allow_click(false);
        let before = surface(&c).marker_count();

        assert_eq!(c.apply_reverse_lookup(click, candidates), Ok(None));
        assert_eq!(surface(&c).marker_count(), before);
        assert_eq!(c.ad_hoc_marker(), None);
        assert_eq!(c.pending(), None);
    }

    #[test]
    fn add_suppresses_duplicate_of_last() {
        let mut c = ready(12.0);
        let p = lookup_place(LngLat::new(-70.64, -33.45));
        resolve(&mut c, MapClick::new(-70.64, -33.45), p);
        assert!(c.activate_add());
        assert!(!c.activate_add());
        assert_eq!(c.selected().len(), 1);
    }

    #[test]
    fn add_from_popup_picks_the_right_place() {
        let mut c = ready(12.0);
        let result = Place::new("place.1", "Santiago", LngLat::new(-70.65, -33.44));
        c.show_search_results(std::slice::from_ref(&result)).unwrap();
        let search_marker = c.markers()[0].id;

        let created = resolve(&mut c, MapClick::new(1.0, 1.0), lookup_place(LngLat::new(0.0, 0.0)));

        assert!(c.add_from_popup(search_marker));
        assert!(c.add_from_popup(created.marker()));
        let names: Vec<&str> = c.selected().iter().map(|p| p.text.as_str()).collect();
        assert_eq!(names, vec!["Santiago", "New Marker"]);

        let location = c.location_marker().unwrap();
        assert!(!c.add_from_popup(location));
    }

    #[test]
    fn disabling_clicks_removes_ad_hoc_and_ignores_clicks() {
        let mut c = ready(12.0);
        let g = MemoryGeocoder::new();
        g.set_default_reverse(vec![lookup_place(LngLat::new(0.0, 0.0))]);
        let outcome = block_on(c.handle_click(&g, MapClick::new(1.0, 1.0)))
            .unwrap()
            .unwrap();

        c.update_allow_click(false);
        assert!(!c.is_click_allowed());
        assert!(surface(&c).marker(outcome.marker()).is_none());
        assert_eq!(c.ad_hoc_marker(), None);
        assert!(!c.activate_add());

        let ignored = block_on(c.handle_click(&g, MapClick::new(2.0, 2.0))).unwrap();
        assert_eq!(ignored, None);
        assert_eq!(g.calls().len(), 1);

        c.update_allow_click(true);
        assert!(block_on(c.handle_click(&g, MapClick::new(2.0, 2.0))).unwrap().is_some());
    }

    #[test]
    fn lookup_failure_is_returned_and_map_untouched() {
        let mut c = ready(12.0);
        let g = MemoryGeocoder::new();
        g.fail_with(GeocodingError::Transport("connection reset".to_string()));
        let before = surface(&c).marker_count();

        let err = block_on(c.handle_click(&g, MapClick::new(1.0, 1.0))).unwrap_err();
        assert_eq!(
            err,
            MapStateError::Lookup(GeocodingError::Transport("connection reset".to_string()))
        );
        assert_eq!(surface(&c).marker_count(), before);
        assert_eq!(c.pending(), None);
    }

    #[test]
    fn empty_lookup_result_is_reported() {
        let mut c = ready(12.0);
        let g = MemoryGeocoder::new();
        let err = block_on(c.handle_click(&g, MapClick::new(1.0, 1.0))).unwrap_err();
        assert_eq!(
            err,
            MapStateError::NoCandidates {
                position: LngLat::new(1.0, 1.0)
            }
        );
    }

    #[test]
    fn fly_to_moves_the_view() {
        let mut c = ready(12.0);
        c.fly_to(-70.64, -33.45);
        assert_eq!(surface(&c).center(), LngLat::new(-70.64, -33.45));
    }
}
