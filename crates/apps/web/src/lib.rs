//! Browser binding: a `MapProvider` object that JavaScript hands its
//! `mapboxgl.Map` to. Clicks, searches and the "Add" buttons all route
//! through one [`MapCoordinator`].

pub mod fetch;
pub mod mapbox;
pub mod surface;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use foundation::LngLat;
use geocoding::{Geocoder, GeocodingConfig, Place, Router, SearchOptions};
use mapstate::{MapClick, MapCoordinator, MarkerId};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use crate::fetch::FetchGeocoder;
use crate::surface::MapboxSurface;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

fn log_error(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

struct Provider {
    coordinator: RefCell<MapCoordinator<MapboxSurface>>,
    geocoder: FetchGeocoder,
    click_listener: RefCell<Option<Closure<dyn FnMut(mapbox::MapMouseEvent)>>>,
    on_selection_change: RefCell<Option<js_sys::Function>>,
}

impl Provider {
    fn notify_selection(&self) {
        let Some(callback) = self.on_selection_change.borrow().clone() else {
            return;
        };
        let json = match self.coordinator.try_borrow() {
            Ok(c) => serde_json::to_string(c.selected().as_slice()),
            Err(_) => return,
        };
        match json {
            Ok(json) => {
                if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    log_error(&format!("selection callback failed: {err:?}"));
                }
            }
            Err(err) => log_error(&format!("selection encode failed: {err}")),
        }
    }

    fn add_from_popup(&self, marker: MarkerId) {
        let added = match self.coordinator.try_borrow_mut() {
            Ok(mut c) => c.add_from_popup(marker),
            Err(_) => {
                log_error("add ignored: map state busy");
                return;
            }
        };
        if added {
            self.notify_selection();
        }
    }

    /// Looks up the clicked point, then resolves it against the markers as
    /// they are when the answer arrives.
    async fn resolve_click(self: Rc<Self>, click: MapClick) {
        if !self.coordinator.borrow().is_click_allowed() {
            return;
        }
        let candidates = match self.geocoder.reverse_lookup(click.position).await {
            Ok(places) => places,
            Err(err) => {
                log_error(&format!("Error in reverse lookup: {err}"));
                return;
            }
        };

        let applied = self
            .coordinator
            .borrow_mut()
            .apply_reverse_lookup(click, candidates);
        match applied {
            Ok(Some(_)) => {}
            Ok(None) => log("lookup dropped: clicks disabled"),
            Err(err) => log_error(&err.to_string()),
        }
    }
}

/// Map state handed to the page: owns the coordinator for one map.
#[wasm_bindgen]
pub struct MapProvider {
    inner: Rc<Provider>,
}

#[wasm_bindgen]
impl MapProvider {
    /// `base_url` points geocoding and directions at another service
    /// (e.g. the places proxy); the public Mapbox endpoints otherwise.
    #[wasm_bindgen(constructor)]
    pub fn new(access_token: String, base_url: Option<String>) -> Result<MapProvider, JsValue> {
        if access_token.trim().is_empty() {
            return Err(JsValue::from_str("access token is required"));
        }
        let mut config = GeocodingConfig::new(access_token);
        if let Some(base) = base_url.as_deref() {
            config = config.with_base_url(base);
        }
        let language = config.language.clone();

        Ok(MapProvider {
            inner: Rc::new(Provider {
                coordinator: RefCell::new(MapCoordinator::new(language)),
                geocoder: FetchGeocoder::new(config),
                click_listener: RefCell::new(None),
                on_selection_change: RefCell::new(None),
            }),
        })
    }

    /// Adopts `map`: drops the location marker at its center and starts
    /// listening for clicks. A previously set map stops being listened to.
    #[wasm_bindgen(js_name = setMap)]
    pub fn set_map(&self, map: mapbox::Map) {
        let weak: Weak<Provider> = Rc::downgrade(&self.inner);
        let on_add = Rc::new(move |marker: MarkerId| {
            if let Some(provider) = weak.upgrade() {
                provider.add_from_popup(marker);
            }
        });

        if let Some(old) = self.inner.click_listener.borrow_mut().take() {
            if let Some(surface) = self.inner.coordinator.borrow().surface() {
                surface.map().off("click", old.as_ref().unchecked_ref());
            }
        }

        let weak: Weak<Provider> = Rc::downgrade(&self.inner);
        let listener = Closure::<dyn FnMut(mapbox::MapMouseEvent)>::new(
            move |event: mapbox::MapMouseEvent| {
                let at = event.lng_lat();
                let click = MapClick::new(at.lng(), at.lat());
                if let Some(provider) = weak.upgrade() {
                    spawn_local(provider.resolve_click(click));
                }
            },
        );
        map.on("click", listener.as_ref().unchecked_ref());

        // The old surface comes back with its markers removed; dropping it
        // frees its popup listeners.
        let previous = self
            .inner
            .coordinator
            .borrow_mut()
            .set_map(MapboxSurface::new(map, on_add));
        drop(previous);
        *self.inner.click_listener.borrow_mut() = Some(listener);
        log("map ready");
    }

    #[wasm_bindgen(js_name = isMapReady)]
    pub fn is_map_ready(&self) -> bool {
        self.inner.coordinator.borrow().is_map_ready()
    }

    #[wasm_bindgen(js_name = updateAllowClick)]
    pub fn update_allow_click(&self, enabled: bool) {
        self.inner.coordinator.borrow_mut().update_allow_click(enabled);
    }

    #[wasm_bindgen(js_name = flyTo)]
    pub fn fly_to(&self, lng: f64, lat: f64) {
        self.inner.coordinator.borrow_mut().fly_to(lng, lat);
    }

    /// Searches for `query`, shows one marker per result and resolves to the
    /// results as a JSON string.
    pub fn search(&self, query: String) -> js_sys::Promise {
        let provider = self.inner.clone();
        future_to_promise(async move {
            let places = provider
                .geocoder
                .search(query, SearchOptions::default())
                .await
                .map_err(to_js_error)?;
            provider
                .coordinator
                .borrow_mut()
                .show_search_results(&places)
                .map_err(to_js_error)?;
            let json = serde_json::to_string(&places).map_err(to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }

    /// Driving route between two points, resolved as the directions JSON.
    pub fn directions(
        &self,
        from_lng: f64,
        from_lat: f64,
        to_lng: f64,
        to_lat: f64,
    ) -> js_sys::Promise {
        let provider = self.inner.clone();
        future_to_promise(async move {
            let waypoints = vec![LngLat::new(from_lng, from_lat), LngLat::new(to_lng, to_lat)];
            let route = provider
                .geocoder
                .directions(waypoints)
                .await
                .map_err(to_js_error)?;
            let json = serde_json::to_string(&route).map_err(to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }

    /// Replaces the list markers (gray) and the selected places with `places_json`.
    #[wasm_bindgen(js_name = updateListPlaces)]
    pub fn update_list_places(&self, places_json: &str) -> Result<(), JsValue> {
        let places: Vec<Place> = serde_json::from_str(places_json).map_err(to_js_error)?;
        self.inner
            .coordinator
            .borrow_mut()
            .update_list_places(places)
            .map_err(to_js_error)?;
        self.inner.notify_selection();
        Ok(())
    }

    /// Adds a place (JSON) to the selected list; `false` for a duplicate of the last entry.
    #[wasm_bindgen(js_name = addPlace)]
    pub fn add_place(&self, place_json: &str) -> Result<bool, JsValue> {
        let place: Place = serde_json::from_str(place_json).map_err(to_js_error)?;
        let added = self.inner.coordinator.borrow_mut().add_place(place);
        if added {
            self.inner.notify_selection();
        }
        Ok(added)
    }

    #[wasm_bindgen(js_name = selectedPlaces)]
    pub fn selected_places(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.inner.coordinator.borrow().selected().as_slice())
            .map_err(to_js_error)
    }

    /// `[{ name, coordinates }]` summary of the selected places.
    #[wasm_bindgen(js_name = selectedDetails)]
    pub fn selected_details(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.coordinator.borrow().selected().details())
            .map_err(to_js_error)
    }

    /// `callback(selectedJson)` runs after every change to the selected list.
    #[wasm_bindgen(js_name = onSelectionChange)]
    pub fn on_selection_change(&self, callback: Option<js_sys::Function>) {
        *self.inner.on_selection_change.borrow_mut() = callback;
    }
}
