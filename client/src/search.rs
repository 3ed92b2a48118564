use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use matjip_shared::{
    BodyEncoding, MatjipError, ResponseKind, ResultItem, SearchPayload, SearchResponse,
};
use wasm_bindgen_futures::spawn_local;

use crate::app::{Busy, BusyStatus, Config, RegionQuery, SearchQuery, SearchResults, VoiceSupported};
use crate::busy::BusyGuard;
use crate::config::ClientConfig;
use crate::{dom, fullscreen, maps, slider, voice};

/// Signals a search touches. Copy, so it can be captured by event handlers
/// and JS callbacks that run outside the component tree.
#[derive(Clone, Copy)]
pub struct SearchContext {
    pub config: StoredValue<ClientConfig>,
    pub query: RwSignal<String>,
    pub region: RwSignal<String>,
    pub busy: RwSignal<bool>,
    pub status: RwSignal<String>,
    pub results: RwSignal<Vec<ResultItem>>,
}

impl SearchContext {
    pub fn from_context() -> Self {
        let Config(config) = expect_context();
        let SearchQuery(query) = expect_context();
        let RegionQuery(region) = expect_context();
        let Busy(busy) = expect_context();
        let BusyStatus(status) = expect_context();
        let SearchResults(results) = expect_context();
        Self {
            config,
            query,
            region,
            busy,
            status,
            results,
        }
    }
}

enum SearchOutcome {
    Structured(SearchResponse),
    Document(String),
}

fn build_payload(
    require_region: bool,
    query: &str,
    region: &str,
) -> Result<SearchPayload, MatjipError> {
    if require_region {
        SearchPayload::legacy(query, region)
    } else {
        SearchPayload::combined(query)
    }
}

fn fetch_error(e: impl std::fmt::Display) -> MatjipError {
    MatjipError::Network(e.to_string())
}

async fn send(
    endpoint: &str,
    encoding: BodyEncoding,
    payload: &SearchPayload,
) -> Result<SearchOutcome, MatjipError> {
    let builder = gloo_net::http::Request::post(endpoint);
    let request = match encoding {
        BodyEncoding::Json => builder.json(payload).map_err(fetch_error)?,
        BodyEncoding::Form => {
            let params =
                web_sys::UrlSearchParams::new().map_err(|e| fetch_error(format!("{e:?}")))?;
            for (key, value) in payload.form_fields() {
                params.append(key, value);
            }
            builder.body(params).map_err(fetch_error)?
        }
    };

    let resp = request.send().await.map_err(fetch_error)?;
    if !resp.ok() {
        return Err(MatjipError::Http {
            status: resp.status(),
        });
    }

    let content_type = resp.headers().get("content-type");
    match ResponseKind::from_content_type(content_type.as_deref()) {
        ResponseKind::Structured => resp
            .json::<SearchResponse>()
            .await
            .map(SearchOutcome::Structured)
            .map_err(|e| MatjipError::Parse(e.to_string())),
        ResponseKind::Document => resp
            .text()
            .await
            .map(SearchOutcome::Document)
            .map_err(|e| MatjipError::Parse(e.to_string())),
    }
}

/// Swap the page body for a server-rendered results document, then remount
/// so the new markup gets its slider and maps.
fn replace_document(html: &str) {
    let Some(body) = dom::document().and_then(|d| d.body()) else {
        return;
    };
    slider::unbind_server_slides();
    fullscreen::close();
    maps::reset();
    body.set_inner_html(html);
    Timeout::new(0, crate::mount_app).forget();
}

/// Validate the current query and post it. Input errors are alerted without
/// touching the network; a search already in flight swallows new submissions.
pub fn submit(ctx: SearchContext) {
    if ctx.busy.get_untracked() {
        web_sys::console::info_1(&"Search already in progress.".into());
        return;
    }
    let (endpoint, encoding, require_region, interval_ms, messages) = ctx.config.with_value(|c| {
        (
            c.search_endpoint.clone(),
            c.body_encoding,
            c.require_region,
            c.status_interval_ms,
            c.status_messages.clone(),
        )
    });
    let query = ctx.query.get_untracked();
    let region = ctx.region.get_untracked();
    let payload = match build_payload(require_region, &query, &region) {
        Ok(payload) => payload,
        Err(e) => {
            dom::alert(&e.user_message());
            return;
        }
    };

    spawn_local(async move {
        let guard = BusyGuard::engage(ctx.busy, ctx.status, interval_ms, messages);
        let outcome = send(&endpoint, encoding, &payload).await;
        drop(guard);

        match outcome {
            Ok(SearchOutcome::Structured(resp)) => {
                web_sys::console::log_1(
                    &format!("Search returned {} results", resp.search_results.len()).into(),
                );
                maps::reset();
                let _ = ctx.results.try_set(resp.search_results);
            }
            Ok(SearchOutcome::Document(html)) => replace_document(&html),
            Err(e) => {
                web_sys::console::error_1(&format!("Search failed: {e}").into());
                dom::alert(&e.user_message());
            }
        }
    });
}

/// Fill the query box with `text` and search for it.
pub fn submit_text(ctx: SearchContext, text: String) {
    ctx.query.set(text);
    submit(ctx);
}

#[component]
pub fn SearchBar() -> impl IntoView {
    let search = SearchContext::from_context();
    let VoiceSupported(voice_supported) = expect_context();
    let require_region = search.config.with_value(|c| c.require_region);

    let on_submit = move |e: leptos::ev::SubmitEvent| {
        e.prevent_default();
        submit(search);
    };

    view! {
        <form id="searchForm" class="search-form" on:submit=on_submit>
            <input
                id="searchInput"
                class="search-input"
                type="text"
                autocomplete="off"
                placeholder="어떤 맛집을 찾으세요?"
                prop:value=move || search.query.get()
                on:input=move |e| search.query.set(event_target_value(&e))
            />
            {require_region.then(|| view! {
                <input
                    id="regionInput"
                    class="region-input"
                    type="text"
                    placeholder="지역"
                    prop:value=move || search.region.get()
                    on:input=move |e| search.region.set(event_target_value(&e))
                />
            })}
            {move || voice_supported.get().then(|| view! {
                <button
                    id="voiceSearchButton"
                    class="voice-btn"
                    type="button"
                    title="음성 검색"
                    on:click=move |_| voice::start()
                >
                    "🎤"
                </button>
            })}
            <button type="submit" class="search-btn" prop:disabled=move || search.busy.get()>
                "검색"
            </button>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::build_payload;
    use matjip_shared::{MatjipError, SearchPayload};

    #[test]
    fn combined_form_ignores_region() {
        let payload = build_payload(false, "  강남 파스타 ", "").unwrap();
        assert_eq!(
            payload,
            SearchPayload::Combined {
                search_input: "강남 파스타".into()
            }
        );
    }

    #[test]
    fn legacy_form_requires_both_fields() {
        assert_eq!(
            build_payload(true, "파스타", "  "),
            Err(MatjipError::MissingRegion)
        );
        assert_eq!(build_payload(false, "   ", ""), Err(MatjipError::EmptyQuery));
    }
}
