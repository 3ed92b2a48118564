use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use matjip_shared::{Carousel, Navigation, ResultItem};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::app::SearchResults;
use crate::maps::{self, map_element_id};

#[component]
fn SlideCard(index: usize, item: ResultItem) -> impl IntoView {
    let ResultItem {
        title,
        description,
        link,
        address,
        ..
    } = item;
    let data_title = title.clone();
    let data_address = address.clone().unwrap_or_default();

    view! {
        <div
            class="result-slide"
            style="flex:0 0 100%;"
            data-title=data_title
            data-address=data_address
        >
            <h3 class="slide-title">{title}</h3>
            <p class="slide-description">{description}</p>
            {address.map(|a| view! { <p class="slide-address">{a}</p> })}
            {(!link.is_empty()).then(|| view! {
                <a class="slide-link" href=link target="_blank" rel="noopener">"자세히 보기"</a>
            })}
            <div id=map_element_id(index) class="map-container" style="width:100%;height:300px;"></div>
        </div>
    }
}

/// Carousel over structured search results. One slide is visible at a time
/// and its map is rendered the first time it is shown.
#[component]
pub fn ResultsCarousel() -> impl IntoView {
    let SearchResults(results) = expect_context();
    let carousel = RwSignal::new(Carousel::new(0));

    // Runs on mount too, after server slides are bound. Slide maps are only
    // released by the submit that delivers a new result set.
    Effect::new(move || {
        let len = results.with(Vec::len);
        carousel.set(Carousel::new(len));
    });

    Effect::new(move || {
        let current = carousel.get();
        if current.is_empty() {
            return;
        }
        let index = current.index();
        let Some(item) = results.with_untracked(|items| items.get(index).cloned()) else {
            return;
        };
        // The slide's map container is rendered in the same turn; wait for it.
        Timeout::new(0, move || maps::activate(index, &item)).forget();
    });

    let step = move |nav: Navigation| {
        let mut next = carousel.get_untracked();
        if next.navigate(nav).is_some() {
            carousel.set(next);
        }
    };

    let slides = move || {
        results
            .get()
            .into_iter()
            .enumerate()
            .map(|(index, item)| view! { <SlideCard index=index item=item /> })
            .collect_view()
    };

    view! {
        <section
            class="results"
            style:display=move || if results.with(Vec::is_empty) { "none" } else { "block" }
        >
            <div class="slider-container" style="overflow:hidden;">
                <div
                    id="resultsWrapper"
                    class="slider-wrapper"
                    style="display:flex;transition:transform 0.3s ease;"
                    style:transform=move || {
                        format!("translateX({}%)", carousel.with(|c| c.offset_px(100.0)))
                    }
                >
                    {slides}
                </div>
            </div>
            <div class="slider-controls">
                <button
                    id="resultsPrev"
                    class="slider-btn"
                    type="button"
                    prop:disabled=move || !carousel.with(|c| c.can_go(Navigation::Previous))
                    on:click=move |_| step(Navigation::Previous)
                >
                    "‹"
                </button>
                <span class="slider-counter">
                    {move || carousel.with(|c| format!("{} / {}", c.index() + 1, c.len()))}
                </span>
                <button
                    id="resultsNext"
                    class="slider-btn"
                    type="button"
                    prop:disabled=move || !carousel.with(|c| c.can_go(Navigation::Next))
                    on:click=move |_| step(Navigation::Next)
                >
                    "›"
                </button>
            </div>
        </section>
    }
}

/// Prev/next wiring for slider markup that arrived in a server-rendered page.
struct ServerSlider {
    buttons: Vec<(web_sys::Element, Closure<dyn Fn()>)>,
}

impl ServerSlider {
    fn detach(self) {
        for (button, handler) in &self.buttons {
            button
                .remove_event_listener_with_callback("click", handler.as_ref().unchecked_ref())
                .ok();
        }
    }
}

thread_local! {
    static SERVER_SLIDER: RefCell<Option<ServerSlider>> = const { RefCell::new(None) };
}

fn slide_item(el: &web_sys::Element) -> ResultItem {
    let title = el
        .get_attribute("data-title")
        .or_else(|| el.get_attribute("data-name"));
    let address = el.get_attribute("data-address");
    let latitude = el
        .get_attribute("data-latitude")
        .or_else(|| el.get_attribute("data-lat"));
    let longitude = el
        .get_attribute("data-longitude")
        .or_else(|| el.get_attribute("data-lng"));
    ResultItem::from_slide_attributes(title, address, latitude.as_deref(), longitude.as_deref())
}

fn collect_slides(document: &web_sys::Document) -> Vec<web_sys::Element> {
    let Ok(nodes) = document.query_selector_all(".slider-item") else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|n| n.dyn_into::<web_sys::Element>().ok())
        .collect()
}

/// Wire server-rendered `.slider-item` slides to `#prevBtn`/`#nextBtn` and
/// render the first slide's map. Returns the number of slides bound.
pub fn bind_server_slides() -> usize {
    unbind_server_slides();
    let Some(document) = crate::dom::document() else {
        return 0;
    };
    let slides = collect_slides(&document);
    if slides.is_empty() {
        return 0;
    }
    let Some(wrapper) = crate::dom::html_element_by_id("sliderWrapper") else {
        web_sys::console::warn_1(&"Slides present without #sliderWrapper.".into());
        return 0;
    };

    let items: Rc<Vec<ResultItem>> = Rc::new(slides.iter().map(slide_item).collect());
    let first_slide = slides[0].clone();
    let state = Rc::new(RefCell::new(Carousel::new(items.len())));

    let mut buttons = Vec::new();
    for (id, nav) in [("prevBtn", Navigation::Previous), ("nextBtn", Navigation::Next)] {
        let Some(button) = document.get_element_by_id(id) else {
            continue;
        };
        let (state, items, wrapper, first_slide) =
            (state.clone(), items.clone(), wrapper.clone(), first_slide.clone());
        let handler = Closure::<dyn Fn()>::new(move || {
            let moved = state.borrow_mut().navigate(nav);
            let Some(index) = moved else {
                return;
            };
            let offset = state.borrow().offset_px(f64::from(first_slide.client_width()));
            wrapper
                .style()
                .set_property("transform", &format!("translateX({offset}px)"))
                .ok();
            maps::activate(index, &items[index]);
        });
        if button
            .add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            buttons.push((button, handler));
        }
    }

    maps::reset();
    maps::activate(0, &items[0]);
    SERVER_SLIDER.with(|slot| *slot.borrow_mut() = Some(ServerSlider { buttons }));
    items.len()
}

pub fn unbind_server_slides() {
    let slider = SERVER_SLIDER.with(|slot| slot.borrow_mut().take());
    if let Some(slider) = slider {
        slider.detach();
    }
}
