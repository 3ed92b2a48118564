//! Minimal bindings to the Naver Maps JS v3 SDK loaded by the page.

use js_sys::{Function, Object, Reflect};
use matjip_shared::{BoundingBox, Coordinates};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["naver", "maps"])]
    pub type LatLng;

    #[wasm_bindgen(constructor, js_namespace = ["naver", "maps"])]
    fn new(lat: f64, lng: f64) -> LatLng;
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["naver", "maps"])]
    pub type LatLngBounds;

    #[wasm_bindgen(constructor, js_namespace = ["naver", "maps"])]
    fn new(south_west: &LatLng, north_east: &LatLng) -> LatLngBounds;
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["naver", "maps"], js_name = Map)]
    pub type NaverMap;

    #[wasm_bindgen(constructor, catch, js_namespace = ["naver", "maps"], js_class = "Map")]
    fn new(target: &web_sys::HtmlElement, options: &JsValue) -> Result<NaverMap, JsValue>;

    #[wasm_bindgen(method, js_name = fitBounds)]
    fn fit_bounds(this: &NaverMap, bounds: &LatLngBounds, margin: &JsValue);

    #[wasm_bindgen(method)]
    fn destroy(this: &NaverMap);
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["naver", "maps"])]
    pub type Marker;

    #[wasm_bindgen(constructor, catch, js_namespace = ["naver", "maps"])]
    fn new(options: &JsValue) -> Result<Marker, JsValue>;

    #[wasm_bindgen(method, js_name = setPosition)]
    fn set_position(this: &Marker, position: &LatLng);

    #[wasm_bindgen(method, js_name = setMap)]
    fn set_map(this: &Marker, map: &JsValue);
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["naver", "maps", "Event"], js_name = addListener)]
    fn add_listener(target: &JsValue, event: &str, handler: &Function) -> JsValue;

    #[wasm_bindgen(js_namespace = ["naver", "maps", "Event"], js_name = removeListener)]
    fn remove_listener(listener: &JsValue);

    #[wasm_bindgen(js_namespace = ["naver", "maps", "Event"], js_name = trigger)]
    fn trigger(target: &JsValue, event: &str);
}

/// True when `window.naver.maps` exists.
pub fn sdk_loaded() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    Reflect::get(window.as_ref(), &JsValue::from_str("naver"))
        .ok()
        .filter(|naver| naver.is_object())
        .and_then(|naver| Reflect::get(&naver, &JsValue::from_str("maps")).ok())
        .is_some_and(|maps| maps.is_object())
}

fn lat_lng(c: Coordinates) -> LatLng {
    LatLng::new(c.latitude, c.longitude)
}

#[derive(Serialize)]
struct Margin {
    top: u32,
    right: u32,
    bottom: u32,
    left: u32,
}

/// A map instance mounted on a DOM element.
pub struct MapHandle {
    map: NaverMap,
}

impl MapHandle {
    pub fn create(
        target: &web_sys::HtmlElement,
        center: Coordinates,
        zoom: u8,
    ) -> Result<Self, JsValue> {
        let options = Object::new();
        Reflect::set(&options, &"center".into(), &lat_lng(center))?;
        Reflect::set(&options, &"zoom".into(), &JsValue::from(zoom))?;
        let map = NaverMap::new(target, &options)?;
        Ok(Self { map })
    }

    pub fn add_marker(&self, position: Coordinates) -> Result<MarkerHandle, JsValue> {
        let options = Object::new();
        Reflect::set(&options, &"position".into(), &lat_lng(position))?;
        Reflect::set(&options, &"map".into(), self.map.as_ref())?;
        Ok(MarkerHandle {
            marker: Marker::new(&options)?,
        })
    }

    /// Fit the viewport to `bounds` with an equal pixel margin on all sides.
    pub fn fit(&self, bounds: BoundingBox, padding_px: u32) {
        let latlng_bounds =
            LatLngBounds::new(&lat_lng(bounds.south_west), &lat_lng(bounds.north_east));
        let margin = Margin {
            top: padding_px,
            right: padding_px,
            bottom: padding_px,
            left: padding_px,
        };
        let margin = serde_wasm_bindgen::to_value(&margin).unwrap_or(JsValue::UNDEFINED);
        self.map.fit_bounds(&latlng_bounds, &margin);
    }

    /// Ask the SDK to re-measure its container after a layout change.
    pub fn notify_resize(&self) {
        trigger(self.map.as_ref(), "resize");
    }

    pub fn on_click(&self, handler: &Function) -> MapListener {
        MapListener {
            listener: add_listener(self.map.as_ref(), "click", handler),
        }
    }
}

impl Drop for MapHandle {
    fn drop(&mut self) {
        self.map.destroy();
    }
}

pub struct MarkerHandle {
    marker: Marker,
}

impl MarkerHandle {
    pub fn move_to(&self, position: Coordinates) {
        self.marker.set_position(&lat_lng(position));
    }
}

impl Drop for MarkerHandle {
    fn drop(&mut self) {
        self.marker.set_map(&JsValue::NULL);
    }
}

/// Registered SDK event listener, removed on drop.
pub struct MapListener {
    listener: JsValue,
}

impl Drop for MapListener {
    fn drop(&mut self) {
        remove_listener(&self.listener);
    }
}
