use gloo_timers::callback::Interval;
use leptos::prelude::*;
use matjip_shared::StatusRotation;

use crate::app::{Busy, BusyStatus};

/// Holds the loading indicator up for as long as it lives. Dropping the guard
/// stops the status rotation and clears the indicator on every exit path.
pub struct BusyGuard {
    busy: RwSignal<bool>,
    _rotation: Interval,
}

impl BusyGuard {
    pub fn engage(
        busy: RwSignal<bool>,
        status: RwSignal<String>,
        interval_ms: u32,
        messages: Vec<String>,
    ) -> Self {
        let mut rotation = StatusRotation::new(messages);
        status.set(rotation.current().to_string());
        busy.set(true);
        let interval = Interval::new(interval_ms.max(1), move || {
            let next = rotation.advance().to_string();
            let _ = status.try_set(next);
        });
        Self {
            busy,
            _rotation: interval,
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let _ = self.busy.try_set(false);
    }
}

#[component]
pub fn BusyOverlay() -> impl IntoView {
    let Busy(busy) = expect_context();
    let BusyStatus(status) = expect_context();

    move || {
        if !busy.get() {
            return ().into_any();
        }
        view! {
            <div id="loadingOverlay" class="loading-overlay" role="status" aria-live="polite">
                <div class="spinner"></div>
                <p class="loading-status">{move || status.get()}</p>
            </div>
        }
        .into_any()
    }
}
