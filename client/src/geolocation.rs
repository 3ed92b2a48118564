use std::cell::RefCell;

use js_sys::Reflect;
use matjip_shared::{Coordinates, LocationHub};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Active `watchPosition` subscription feeding the location hub.
struct LocationWatch {
    geolocation: web_sys::Geolocation,
    watch_id: i32,
    _on_position: Closure<dyn Fn(JsValue)>,
    _on_error: Closure<dyn Fn(JsValue)>,
}

impl LocationWatch {
    fn cancel(self) {
        self.geolocation.clear_watch(self.watch_id);
    }
}

thread_local! {
    static LOCATION_WATCH: RefCell<Option<LocationWatch>> = const { RefCell::new(None) };
    static LOCATION_HUB: LocationHub = LocationHub::new();
}

/// The page-wide user location. The geolocation watch is its only writer.
pub fn hub() -> LocationHub {
    LOCATION_HUB.with(Clone::clone)
}

fn read_number(target: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(target, &JsValue::from_str(key)).ok()?.as_f64()
}

fn coordinates_from_position(position: &JsValue) -> Option<Coordinates> {
    let coords = Reflect::get(position, &JsValue::from_str("coords")).ok()?;
    let latitude = read_number(&coords, "latitude")?;
    let longitude = read_number(&coords, "longitude")?;
    Coordinates::new(latitude, longitude).ok()
}

/// Start the continuous high-accuracy watch. Replaces any existing watch.
/// Returns false when the browser has no geolocation.
pub fn start(hub: LocationHub, timeout_ms: u32) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let Ok(geolocation) = window.navigator().geolocation() else {
        web_sys::console::info_1(&"Geolocation unavailable; skipping live location.".into());
        return false;
    };

    let on_position = Closure::<dyn Fn(JsValue)>::new(move |position: JsValue| {
        if let Some(coords) = coordinates_from_position(&position) {
            hub.publish(coords);
        }
    });
    let on_error = Closure::<dyn Fn(JsValue)>::new(move |err: JsValue| {
        let message = Reflect::get(&err, &JsValue::from_str("message"))
            .ok()
            .and_then(|m| m.as_string())
            .unwrap_or_default();
        web_sys::console::warn_1(&format!("Geolocation error: {message}").into());
    });

    let options = web_sys::PositionOptions::new();
    Reflect::set(&options, &"enableHighAccuracy".into(), &JsValue::TRUE).ok();
    Reflect::set(&options, &"maximumAge".into(), &JsValue::from(0)).ok();
    Reflect::set(&options, &"timeout".into(), &JsValue::from(timeout_ms)).ok();

    let watch_id = match geolocation.watch_position_with_error_callback_and_options(
        on_position.as_ref().unchecked_ref(),
        Some(on_error.as_ref().unchecked_ref()),
        &options,
    ) {
        Ok(id) => id,
        Err(e) => {
            web_sys::console::warn_1(&format!("watchPosition failed: {e:?}").into());
            return false;
        }
    };

    LOCATION_WATCH.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(old) = slot.take() {
            old.cancel();
        }
        *slot = Some(LocationWatch {
            geolocation,
            watch_id,
            _on_position: on_position,
            _on_error: on_error,
        });
    });
    true
}

/// Cancel the watch. Safe to call repeatedly.
pub fn stop() {
    LOCATION_WATCH.with(|slot| {
        if let Some(watch) = slot.borrow_mut().take() {
            watch.cancel();
        }
    });
}
