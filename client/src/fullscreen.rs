use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use matjip_shared::{BoundingBox, Coordinates, LocationHub, Subscription};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::dom;
use crate::naver::{MapHandle, MarkerHandle};

const OVERLAY_ID: &str = "map-fullscreen-overlay";
const CLOSE_BUTTON_ID: &str = "map-fullscreen-close";

const OVERLAY_STYLE: &str = "position:fixed;inset:0;z-index:1000;display:flex;\
    align-items:center;justify-content:center;background:rgba(0,0,0,0.6);";
const FRAME_STYLE: &str = "position:relative;width:92vw;height:88vh;background:#fff;\
    border-radius:8px;overflow:hidden;";
const CANVAS_STYLE: &str = "width:100%;height:100%;";
const CLOSE_STYLE: &str = "position:absolute;top:12px;right:12px;z-index:1;padding:6px 12px;\
    border:none;border-radius:4px;background:#333;color:#fff;cursor:pointer;";

/// Enlarged map for one store, tracking the user's position while open.
struct FullscreenOverlay {
    subscription: Subscription,
    window: web_sys::Window,
    on_keydown: Closure<dyn Fn(web_sys::KeyboardEvent)>,
    on_click: Closure<dyn Fn(web_sys::MouseEvent)>,
    user_marker: Rc<RefCell<Option<MarkerHandle>>>,
    store_marker: MarkerHandle,
    map: Rc<MapHandle>,
    root: web_sys::Element,
}

impl FullscreenOverlay {
    fn close(self) {
        let Self {
            subscription,
            window,
            on_keydown,
            on_click,
            user_marker,
            store_marker,
            map,
            root,
        } = self;
        drop(subscription);
        window
            .remove_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref())
            .ok();
        root.remove_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
            .ok();
        user_marker.borrow_mut().take();
        drop(store_marker);
        drop(map);
        root.remove();
    }
}

thread_local! {
    static OVERLAY: RefCell<Option<FullscreenOverlay>> = const { RefCell::new(None) };
}

fn follow_user(
    map: &MapHandle,
    marker: &RefCell<Option<MarkerHandle>>,
    store: Coordinates,
    user: Coordinates,
    padding_px: u32,
) {
    let mut marker = marker.borrow_mut();
    match marker.as_ref() {
        Some(existing) => existing.move_to(user),
        None => match map.add_marker(user) {
            Ok(created) => *marker = Some(created),
            Err(e) => {
                web_sys::console::warn_1(&format!("Fullscreen user marker failed: {e:?}").into());
                return;
            }
        },
    }
    if let Some(bounds) = BoundingBox::covering(&[store, user]) {
        map.fit(bounds, padding_px);
    }
}

fn create_styled(
    document: &web_sys::Document,
    tag: &str,
    style: &str,
) -> Result<web_sys::Element, JsValue> {
    let el = document.create_element(tag)?;
    el.set_attribute("style", style)?;
    Ok(el)
}

fn build(
    store: Coordinates,
    hub: &LocationHub,
    zoom: u8,
    padding_px: u32,
) -> Result<FullscreenOverlay, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = dom::document().ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?;

    let root = create_styled(&document, "div", OVERLAY_STYLE)?;
    root.set_id(OVERLAY_ID);
    root.set_class_name("map-fullscreen-overlay");
    let frame = create_styled(&document, "div", FRAME_STYLE)?;
    let canvas = create_styled(&document, "div", CANVAS_STYLE)?;
    let close_button = create_styled(&document, "button", CLOSE_STYLE)?;
    close_button.set_id(CLOSE_BUTTON_ID);
    close_button.set_attribute("type", "button")?;
    close_button.set_attribute("aria-label", "지도 닫기")?;
    close_button.set_text_content(Some("닫기"));

    frame.append_child(&canvas)?;
    frame.append_child(&close_button)?;
    root.append_child(&frame)?;
    body.append_child(&root)?;

    let canvas: web_sys::HtmlElement = canvas.dyn_into()?;
    let map = Rc::new(MapHandle::create(&canvas, store, zoom)?);
    let store_marker = map.add_marker(store)?;
    let user_marker = Rc::new(RefCell::new(None));

    if let Some(user) = hub.latest() {
        follow_user(&map, &user_marker, store, user, padding_px);
    }
    let subscription = {
        let map = map.clone();
        let user_marker = user_marker.clone();
        hub.subscribe(move |user| follow_user(&map, &user_marker, store, user, padding_px))
    };

    // Handlers close on the next tick; the overlay owns these closures.
    let on_click = Closure::<dyn Fn(web_sys::MouseEvent)>::new(move |event: web_sys::MouseEvent| {
        let Some(target) = event
            .target()
            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        else {
            return;
        };
        let id = target.id();
        if id == OVERLAY_ID || id == CLOSE_BUTTON_ID {
            Timeout::new(0, close).forget();
        }
    });
    root.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;

    let on_keydown =
        Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |event: web_sys::KeyboardEvent| {
            if event.key() == "Escape" {
                Timeout::new(0, close).forget();
            }
        });
    window.add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref())?;

    map.notify_resize();

    Ok(FullscreenOverlay {
        subscription,
        window,
        on_keydown,
        on_click,
        user_marker,
        store_marker,
        map,
        root,
    })
}

/// Open the enlarged map for `store`. Any overlay already open is closed first.
pub fn open(store: Coordinates, hub: &LocationHub, zoom: u8, padding_px: u32) {
    close();
    match build(store, hub, zoom, padding_px) {
        Ok(overlay) => OVERLAY.with(|slot| *slot.borrow_mut() = Some(overlay)),
        Err(e) => {
            web_sys::console::error_1(&format!("Fullscreen map failed: {e:?}").into());
            if let Some(stray) = dom::document().and_then(|d| d.get_element_by_id(OVERLAY_ID)) {
                stray.remove();
            }
        }
    }
}

/// Close the overlay, removing its DOM and its location subscription.
pub fn close() {
    let overlay = OVERLAY.with(|slot| slot.borrow_mut().take());
    if let Some(overlay) = overlay {
        overlay.close();
    }
}
