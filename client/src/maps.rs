use std::cell::RefCell;
use std::rc::Rc;

use matjip_shared::{
    ActivationPlan, BoundingBox, Coordinates, LocationHub, MapSlots, MatjipError, ResultItem,
    SlotTicket, Subscription,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::config::ClientConfig;
use crate::naver::{MapHandle, MapListener, MarkerHandle};
use crate::{dom, fullscreen, geocode};

pub fn map_element_id(index: usize) -> String {
    format!("map-{index}")
}

/// One rendered slide map. Field order is drop order: listeners and markers
/// are released before the map itself is destroyed.
struct MapBinding {
    _click: (MapListener, Closure<dyn Fn()>),
    user_marker: Option<MarkerHandle>,
    _store_marker: MarkerHandle,
    map: MapHandle,
    store: Coordinates,
}

impl MapBinding {
    fn show_user(&mut self, user: Coordinates, padding_px: u32) -> Result<(), JsValue> {
        match &self.user_marker {
            Some(marker) => marker.move_to(user),
            None => self.user_marker = Some(self.map.add_marker(user)?),
        }
        if let Some(bounds) = BoundingBox::covering(&[self.store, user]) {
            self.map.fit(bounds, padding_px);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct MapSettings {
    zoom: u8,
    padding_px: u32,
    geocode_endpoint: String,
    sdk_available: bool,
}

/// Lazily materializes slide maps and keeps their user-location markers in
/// step with the location hub.
pub struct MapController {
    slots: RefCell<MapSlots<MapBinding>>,
    settings: MapSettings,
    hub: LocationHub,
    location: RefCell<Option<Subscription>>,
}

thread_local! {
    static MAP_CONTROLLER: RefCell<Option<Rc<MapController>>> = const { RefCell::new(None) };
}

impl MapController {
    fn new(config: &ClientConfig, hub: LocationHub, sdk_available: bool) -> Rc<Self> {
        let controller = Rc::new(Self {
            slots: RefCell::new(MapSlots::new()),
            settings: MapSettings {
                zoom: config.map_zoom,
                padding_px: config.fit_bounds_padding_px,
                geocode_endpoint: config.geocode_endpoint.clone(),
                sdk_available,
            },
            hub: hub.clone(),
            location: RefCell::new(None),
        });
        let weak = Rc::downgrade(&controller);
        let subscription = hub.subscribe(move |user| {
            if let Some(controller) = weak.upgrade() {
                controller.on_user_location(user);
            }
        });
        *controller.location.borrow_mut() = Some(subscription);
        controller
    }

    fn activate(self: &Rc<Self>, index: usize, item: &ResultItem) {
        let plan = self
            .slots
            .borrow_mut()
            .plan_activation(index, item, self.settings.sdk_available);
        match plan {
            ActivationPlan::Materialize { ticket, store } => self.materialize(ticket, store),
            ActivationPlan::Geocode { ticket, address } => {
                let controller = self.clone();
                spawn_local(async move {
                    match geocode::lookup(&controller.settings.geocode_endpoint, &address).await {
                        Ok(store) => controller.materialize(ticket, store),
                        Err(e) => controller.abandon(ticket, e),
                    }
                });
            }
            ActivationPlan::Refresh => {
                if let Some(binding) = self.slots.borrow().binding(index) {
                    binding.map.notify_resize();
                }
            }
            ActivationPlan::Skip => {}
            ActivationPlan::Abandoned { index, error } => {
                web_sys::console::error_1(
                    &format!("Map for slide {index} unavailable: {error}").into(),
                );
            }
        }
    }

    fn materialize(&self, ticket: SlotTicket, store: Coordinates) {
        let id = map_element_id(ticket.index);
        let Some(target) = dom::html_element_by_id(&id) else {
            self.abandon(ticket, MatjipError::MissingElement(id));
            return;
        };
        let binding = match self.build_binding(&target, store) {
            Ok(binding) => binding,
            Err(e) => {
                self.abandon(ticket, MatjipError::MapSdk(format!("{e:?}")));
                return;
            }
        };
        let completed = self.slots.borrow_mut().complete(ticket, binding);
        match completed {
            Ok(()) => {
                let rendered = self.slots.borrow().rendered_count();
                web_sys::console::log_1(
                    &format!("Map ready for slide {} ({rendered} rendered)", ticket.index).into(),
                );
            }
            Err(stale) => {
                drop(stale);
                web_sys::console::info_1(
                    &format!("Discarded map for slide {} from a previous result set", ticket.index)
                        .into(),
                );
            }
        }
    }

    fn build_binding(
        &self,
        target: &web_sys::HtmlElement,
        store: Coordinates,
    ) -> Result<MapBinding, JsValue> {
        target.class_list().add_1("map-ready").ok();
        let map = MapHandle::create(target, store, self.settings.zoom)?;
        let store_marker = map.add_marker(store)?;

        let hub = self.hub.clone();
        let (zoom, padding_px) = (self.settings.zoom, self.settings.padding_px);
        let on_click = Closure::<dyn Fn()>::new(move || {
            fullscreen::open(store, &hub, zoom, padding_px);
        });
        let listener = map.on_click(on_click.as_ref().unchecked_ref());

        let mut binding = MapBinding {
            _click: (listener, on_click),
            user_marker: None,
            _store_marker: store_marker,
            map,
            store,
        };
        if let Some(user) = self.hub.latest() {
            binding.show_user(user, padding_px)?;
        }
        Ok(binding)
    }

    fn abandon(&self, ticket: SlotTicket, error: MatjipError) {
        web_sys::console::error_1(
            &format!("Map for slide {} unavailable: {error}", ticket.index).into(),
        );
        self.slots.borrow_mut().fail(ticket, error);
    }

    fn on_user_location(&self, user: Coordinates) {
        let padding_px = self.settings.padding_px;
        let mut slots = self.slots.borrow_mut();
        for (index, binding) in slots.rendered_mut() {
            if let Err(e) = binding.show_user(user, padding_px) {
                web_sys::console::warn_1(
                    &format!("User marker update failed on slide {index}: {e:?}").into(),
                );
            }
        }
    }

    fn reset(&self) {
        let released = self.slots.borrow_mut().reset();
        drop(released);
    }
}

fn controller() -> Option<Rc<MapController>> {
    MAP_CONTROLLER.with(|slot| slot.borrow().clone())
}

/// Install the page's map controller, replacing (and releasing) any previous one.
pub fn install(config: &ClientConfig, hub: LocationHub, sdk_available: bool) {
    let controller = MapController::new(config, hub, sdk_available);
    let previous = MAP_CONTROLLER.with(|slot| slot.borrow_mut().replace(controller));
    if let Some(previous) = previous {
        previous.reset();
    }
}

/// Render the map for the slide at `index` if it has not been rendered yet.
pub fn activate(index: usize, item: &ResultItem) {
    if let Some(controller) = controller() {
        controller.activate(index, item);
    }
}

/// Release every slide map. In-flight geocodes for the old set are ignored.
pub fn reset() {
    if let Some(controller) = controller() {
        controller.reset();
    }
}

pub fn teardown() {
    let controller = MAP_CONTROLLER.with(|slot| slot.borrow_mut().take());
    if let Some(controller) = controller {
        controller.reset();
        controller.location.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::map_element_id;

    #[test]
    fn map_ids_follow_slide_positions() {
        assert_eq!(map_element_id(0), "map-0");
        assert_eq!(map_element_id(12), "map-12");
    }
}
