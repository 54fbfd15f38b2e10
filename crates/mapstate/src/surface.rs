//! The seam to the map rendering library.
//!
//! Markers and popups live inside the rendering library; the coordinator only
//! holds [`MarkerId`]s and releases markers through [`RenderSurface::remove_marker`].

use foundation::LngLat;
use foundation::handles::Handle;

use crate::popup::Popup;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MarkerId(pub Handle);

impl MarkerId {
    pub fn index(&self) -> u32 {
        self.0.index()
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum MarkerColor {
    /// Library default (search results and clicked points).
    #[default]
    Default,
    /// Entries of the places list.
    Gray,
    /// The initial "my location" marker.
    Red,
}

impl MarkerColor {
    pub fn css(self) -> Option<&'static str> {
        match self {
            MarkerColor::Default => None,
            MarkerColor::Gray => Some("gray"),
            MarkerColor::Red => Some("red"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: LngLat,
    pub color: MarkerColor,
    pub popup: Option<Popup>,
}

impl MarkerSpec {
    pub fn new(position: LngLat) -> Self {
        Self {
            position,
            color: MarkerColor::Default,
            popup: None,
        }
    }

    pub fn with_color(mut self, color: MarkerColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_popup(mut self, popup: Popup) -> Self {
        self.popup = Some(popup);
        self
    }
}

/// Operations the coordinator needs from a map.
///
/// Methods taking a `MarkerId` return `false` when the marker is gone.
pub trait RenderSurface {
    fn center(&self) -> LngLat;

    fn zoom(&self) -> f64;

    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerId;

    fn remove_marker(&mut self, marker: MarkerId) -> bool;

    fn marker_position(&self, marker: MarkerId) -> Option<LngLat>;

    /// Replaces the popup attached to `marker`.
    fn set_popup(&mut self, marker: MarkerId, popup: Popup) -> bool;

    /// Shows the popup of `marker`; a no-op if it is already open.
    fn open_popup(&mut self, marker: MarkerId) -> bool;

    fn close_popup(&mut self, marker: MarkerId) -> bool;

    fn is_popup_open(&self, marker: MarkerId) -> bool;

    /// Animates the viewport to `center`, keeping the zoom.
    fn fly_to(&mut self, center: LngLat);
}
