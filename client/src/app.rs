use leptos::prelude::*;
use wasm_bindgen::JsCast;

use std::cell::RefCell;

use matjip_shared::ResultItem;
use matjip_shared::auth::Session;

use crate::auth::{self, AuthPanel};
use crate::busy::BusyOverlay;
use crate::config::ClientConfig;
use crate::dom::Capabilities;
use crate::recommendations::RecommendationCards;
use crate::search::{self, SearchBar, SearchContext};
use crate::slider::{self, ResultsCarousel};
use crate::{fullscreen, geolocation, maps, voice};

struct PageHideBinding {
    window: web_sys::Window,
    _handler: wasm_bindgen::closure::Closure<dyn Fn()>,
}

thread_local! {
    static PAGEHIDE_BINDING: RefCell<Option<PageHideBinding>> = const { RefCell::new(None) };
}

/// Newtype wrappers so signals of the same type get distinct context slots.
#[derive(Clone, Copy)]
pub(crate) struct SearchQuery(pub RwSignal<String>);
#[derive(Clone, Copy)]
pub(crate) struct RegionQuery(pub RwSignal<String>);
#[derive(Clone, Copy)]
pub(crate) struct Busy(pub RwSignal<bool>);
#[derive(Clone, Copy)]
pub(crate) struct BusyStatus(pub RwSignal<String>);
#[derive(Clone, Copy)]
pub(crate) struct SearchResults(pub RwSignal<Vec<ResultItem>>);
#[derive(Clone, Copy)]
pub(crate) struct CurrentSession(pub RwSignal<Option<Session>>);
#[derive(Clone, Copy)]
pub(crate) struct VoiceSupported(pub RwSignal<bool>);
#[derive(Clone, Copy)]
pub(crate) struct Config(pub StoredValue<ClientConfig>);

/// Release every page-lifetime resource: the location watch, the recognizer
/// and the fullscreen overlay.
fn release_page_resources() {
    geolocation::stop();
    voice::teardown();
    fullscreen::close();
}

#[component]
pub fn App() -> impl IntoView {
    let client_config = ClientConfig::load();
    let capabilities = Capabilities::detect();
    web_sys::console::log_1(
        &format!(
            "Capabilities: speech={} geolocation={} maps={}",
            capabilities.speech_recognition, capabilities.geolocation, capabilities.map_sdk
        )
        .into(),
    );

    let session = RwSignal::new(auth::check_status(client_config.session_ttl()));
    let config = StoredValue::new(client_config);
    let query = RwSignal::new(String::new());
    let region = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    let status = RwSignal::new(String::new());
    let results: RwSignal<Vec<ResultItem>> = RwSignal::new(Vec::new());
    let voice_supported = RwSignal::new(false);

    provide_context(capabilities);
    provide_context(Config(config));
    provide_context(SearchQuery(query));
    provide_context(RegionQuery(region));
    provide_context(Busy(busy));
    provide_context(BusyStatus(status));
    provide_context(SearchResults(results));
    provide_context(CurrentSession(session));
    provide_context(VoiceSupported(voice_supported));

    let search = SearchContext::from_context();

    // Maps and live location share one hub for the page lifetime.
    Effect::new(move || {
        let hub = geolocation::hub();
        config.with_value(|c| maps::install(c, hub.clone(), capabilities.map_sdk));
        if capabilities.geolocation {
            let timeout_ms = config.with_value(|c| c.geolocation_timeout_ms);
            geolocation::start(hub, timeout_ms);
        }
        let bound = slider::bind_server_slides();
        if bound > 0 {
            web_sys::console::log_1(&format!("Bound {bound} server-rendered slides").into());
        }
        on_cleanup(|| {
            slider::unbind_server_slides();
            fullscreen::close();
            maps::teardown();
            geolocation::stop();
        });
    });

    // Voice input resolves once; the trigger stays hidden without support.
    Effect::new(move || {
        if !capabilities.speech_recognition {
            voice_supported.set(false);
            return;
        }
        let (locale, auto_submit) =
            config.with_value(|c| (c.speech_locale.clone(), c.voice_auto_submit));
        let supported = voice::install(&locale, move |transcript| {
            web_sys::console::log_1(&format!("Voice transcript: {transcript}").into());
            if auto_submit {
                search::submit_text(search, transcript);
            } else {
                query.set(transcript);
            }
        });
        voice_supported.set(supported);
        on_cleanup(voice::teardown);
    });

    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };

        PAGEHIDE_BINDING.with(|slot| {
            if let Some(old) = slot.borrow_mut().take() {
                let _ = old.window.remove_event_listener_with_callback(
                    "pagehide",
                    old._handler.as_ref().unchecked_ref(),
                );
            }
        });

        let handler = wasm_bindgen::closure::Closure::<dyn Fn()>::new(release_page_resources);
        if window
            .add_event_listener_with_callback("pagehide", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            PAGEHIDE_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(PageHideBinding {
                    window: window.clone(),
                    _handler: handler,
                });
            });
        }
    });

    view! {
        <div class="matjip-app">
            <header class="app-header">
                <h1 class="app-title">"맛집 추천"</h1>
                <AuthPanel />
            </header>
            <main class="app-main">
                <SearchBar />
                <RecommendationCards />
                <ResultsCarousel />
            </main>
            <BusyOverlay />
        </div>
    }
}
