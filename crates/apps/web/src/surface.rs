use std::rc::Rc;

use foundation::{Arena, LngLat};
use mapstate::popup::ADD_BUTTON_ID;
use mapstate::{MarkerId, MarkerSpec, Popup, RenderSurface};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::mapbox;

/// Pixel offset of popups above their marker pin.
const POPUP_OFFSET_PX: f64 = 25.0;

/// Called with the marker whose popup "Add" button was pressed.
pub type AddHandler = Rc<dyn Fn(MarkerId)>;

struct MapboxMarker {
    marker: mapbox::Marker,
    popup: Option<BoundPopup>,
}

/// A popup with its listeners; dropping it releases the closures.
struct BoundPopup {
    popup: mapbox::Popup,
    _on_open: Closure<dyn FnMut()>,
    _on_add: Closure<dyn FnMut()>,
}

/// [`RenderSurface`] over a live Mapbox GL map.
pub struct MapboxSurface {
    map: mapbox::Map,
    markers: Arena<MapboxMarker>,
    on_add: AddHandler,
}

impl MapboxSurface {
    pub fn new(map: mapbox::Map, on_add: AddHandler) -> Self {
        Self {
            map,
            markers: Arena::new(),
            on_add,
        }
    }

    pub fn map(&self) -> &mapbox::Map {
        &self.map
    }

    /// Creates the mapboxgl popup for `content` and wires its "Add" button
    /// each time the popup opens.
    fn bind_popup(&self, marker: MarkerId, content: &Popup) -> Result<BoundPopup, JsValue> {
        let popup = mapbox::Popup::new(&mapbox::options(&[(
            "offset",
            JsValue::from_f64(POPUP_OFFSET_PX),
        )])?);
        popup.set_html(&content.to_html());

        let on_add = self.on_add.clone();
        let add_cb = Closure::<dyn FnMut()>::new(move || on_add(marker));
        let add_fn: js_sys::Function = add_cb.as_ref().unchecked_ref::<js_sys::Function>().clone();

        let opened = popup.clone();
        let wants_button = content.add_button;
        let open_cb = Closure::<dyn FnMut()>::new(move || {
            if !wants_button {
                return;
            }
            let button = opened
                .get_element()
                .and_then(|el| el.query_selector(&format!("#{ADD_BUTTON_ID}")).ok().flatten())
                .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok());
            match button {
                Some(button) => button.set_onclick(Some(&add_fn)),
                None => web_sys::console::warn_1(&JsValue::from_str("popup has no add button")),
            }
        });
        popup.on("open", open_cb.as_ref().unchecked_ref());

        Ok(BoundPopup {
            popup,
            _on_open: open_cb,
            _on_add: add_cb,
        })
    }
}

fn to_lng_lat(p: &mapbox::LngLat) -> LngLat {
    LngLat::new(p.lng(), p.lat())
}

fn log_error(what: &str, err: &JsValue) {
    web_sys::console::error_1(&JsValue::from_str(&format!("{what}: {err:?}")));
}

impl RenderSurface for MapboxSurface {
    fn center(&self) -> LngLat {
        to_lng_lat(&self.map.get_center())
    }

    fn zoom(&self) -> f64 {
        self.map.get_zoom()
    }

    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerId {
        let opts = match spec.color.css() {
            Some(color) => mapbox::options(&[("color", JsValue::from_str(color))]),
            None => mapbox::options(&[]),
        }
        .unwrap_or_else(|err| {
            log_error("marker options", &err);
            JsValue::UNDEFINED
        });

        let marker = mapbox::Marker::new(&opts);
        marker.set_lng_lat(&mapbox::lng_lat_array(spec.position.lng, spec.position.lat));
        marker.add_to(&self.map);

        let id = MarkerId(self.markers.insert(MapboxMarker {
            marker,
            popup: None,
        }));
        if let Some(content) = spec.popup {
            self.set_popup(id, content);
        }
        id
    }

    fn remove_marker(&mut self, marker: MarkerId) -> bool {
        match self.markers.remove(marker.0) {
            Some(m) => {
                m.marker.remove();
                true
            }
            None => false,
        }
    }

    fn marker_position(&self, marker: MarkerId) -> Option<LngLat> {
        self.markers
            .get(marker.0)
            .map(|m| to_lng_lat(&m.marker.get_lng_lat()))
    }

    fn set_popup(&mut self, marker: MarkerId, popup: Popup) -> bool {
        if !self.markers.contains(marker.0) {
            return false;
        }
        let bound = match self.bind_popup(marker, &popup) {
            Ok(bound) => bound,
            Err(err) => {
                log_error("popup", &err);
                return false;
            }
        };
        let Some(m) = self.markers.get_mut(marker.0) else {
            return false;
        };
        m.marker.set_popup(&bound.popup);
        m.popup = Some(bound);
        true
    }

    fn open_popup(&mut self, marker: MarkerId) -> bool {
        match self.markers.get(marker.0) {
            Some(MapboxMarker {
                marker,
                popup: Some(bound),
            }) => {
                if !bound.popup.is_open() {
                    marker.toggle_popup();
                }
                true
            }
            _ => false,
        }
    }

    fn close_popup(&mut self, marker: MarkerId) -> bool {
        match self.markers.get(marker.0) {
            Some(MapboxMarker {
                marker,
                popup: Some(bound),
            }) => {
                if bound.popup.is_open() {
                    marker.toggle_popup();
                }
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    fn is_popup_open(&self, marker: MarkerId) -> bool {
        self.markers
            .get(marker.0)
            .and_then(|m| m.popup.as_ref())
            .is_some_and(|b| b.popup.is_open())
    }

    fn fly_to(&mut self, center: LngLat) {
        match mapbox::options(&[("center", mapbox::lng_lat_array(center.lng, center.lat))]) {
            Ok(opts) => self.map.fly_to(&opts),
            Err(err) => log_error("fly_to", &err),
        }
    }
}
