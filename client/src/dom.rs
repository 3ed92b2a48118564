use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};

pub fn document() -> Option<web_sys::Document> {
    web_sys::window()?.document()
}

pub fn html_element_by_id(id: &str) -> Option<web_sys::HtmlElement> {
    document()?
        .get_element_by_id(id)?
        .dyn_into::<web_sys::HtmlElement>()
        .ok()
}

/// Blocking user-visible notice.
pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        window.alert_with_message(message).ok();
    }
}

/// Set or clear the `hidden` attribute on every element matching `selector`.
pub fn set_hidden_all(selector: &str, hidden: bool) {
    let Some(document) = document() else {
        return;
    };
    let Ok(nodes) = document.query_selector_all(selector) else {
        return;
    };
    for i in 0..nodes.length() {
        let Some(el) = nodes.item(i).and_then(|n| n.dyn_into::<web_sys::Element>().ok()) else {
            continue;
        };
        if hidden {
            el.set_attribute("hidden", "").ok();
        } else {
            el.remove_attribute("hidden").ok();
        }
    }
}

/// Browser features resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub speech_recognition: bool,
    pub geolocation: bool,
    pub map_sdk: bool,
}

impl Capabilities {
    pub fn detect() -> Self {
        let Some(window) = web_sys::window() else {
            return Self {
                speech_recognition: false,
                geolocation: false,
                map_sdk: false,
            };
        };
        let has = |target: &JsValue, key: &str| {
            Reflect::get(target, &JsValue::from_str(key))
                .map(|v| !v.is_undefined() && !v.is_null())
                .unwrap_or(false)
        };
        let speech_recognition = has(window.as_ref(), "SpeechRecognition")
            || has(window.as_ref(), "webkitSpeechRecognition");
        let geolocation = has(window.navigator().as_ref(), "geolocation");
        Self {
            speech_recognition,
            geolocation,
            map_sdk: crate::naver::sdk_loaded(),
        }
    }
}
