use leptos::prelude::*;
use matjip_shared::RecommendationPool;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::search::{self, SearchContext};

fn page_rng() -> SmallRng {
    let entropy = (js_sys::Math::random() * u64::MAX as f64) as u64;
    SmallRng::seed_from_u64(entropy ^ js_sys::Date::now() as u64)
}

/// Suggestion cards drawn once per page load. Clicking one searches for it.
#[component]
pub fn RecommendationCards() -> impl IntoView {
    let search = SearchContext::from_context();
    let count = search.config.with_value(|c| c.recommendation_count);

    let pool = RecommendationPool::default();
    let phrases: Vec<String> = pool
        .sample(count, &mut page_rng())
        .into_iter()
        .map(str::to_string)
        .collect();

    let cards = phrases
        .into_iter()
        .map(|phrase| {
            let on_click = {
                let phrase = phrase.clone();
                move |_| search::submit_text(search, phrase.clone())
            };
            let on_keydown = {
                let phrase = phrase.clone();
                move |e: leptos::ev::KeyboardEvent| {
                    if e.key() == "Enter" {
                        search::submit_text(search, phrase.clone());
                    }
                }
            };
            view! {
                <div class="card" role="button" tabindex="0" on:click=on_click on:keydown=on_keydown>
                    <span class="card-text">{phrase}</span>
                </div>
            }
        })
        .collect_view();

    view! { <div id="cardContainer" class="card-container">{cards}</div> }
}
