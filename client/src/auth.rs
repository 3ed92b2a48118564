use std::cell::RefCell;

use chrono::Utc;
use gloo_storage::{LocalStorage, Storage};
use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use matjip_shared::auth::{ACCESS_TOKEN_KEY, ISSUED_AT_KEY, USERNAME_KEY};
use matjip_shared::auth::{Credentials, LoginResponse, Session, SignupResponse};
use matjip_shared::MatjipError;
use serde::de::DeserializeOwned;
use wasm_bindgen_futures::spawn_local;

use crate::app::{Config, CurrentSession};
use crate::config::ClientConfig;
use crate::dom;

thread_local! {
    static SESSION_EXPIRY: RefCell<Option<Timeout>> = const { RefCell::new(None) };
}

fn read_raw(key: &str) -> Option<String> {
    LocalStorage::raw().get_item(key).ok().flatten()
}

fn persist_session(session: &Session) {
    let storage = LocalStorage::raw();
    let issued_at = session.issued_at.unwrap_or_else(Utc::now).to_rfc3339();
    for (key, value) in [
        (ACCESS_TOKEN_KEY, session.token.as_str()),
        (USERNAME_KEY, session.username.as_str()),
        (ISSUED_AT_KEY, issued_at.as_str()),
    ] {
        if let Err(e) = storage.set_item(key, value) {
            web_sys::console::warn_1(&format!("Failed to persist {key}: {e:?}").into());
        }
    }
}

fn clear_session() {
    for key in [ACCESS_TOKEN_KEY, USERNAME_KEY, ISSUED_AT_KEY] {
        LocalStorage::delete(key);
    }
}

/// Restore the stored session. Expired or undated sessions are cleared.
pub fn check_status(ttl: chrono::Duration) -> Option<Session> {
    let session = Session::from_stored(
        read_raw(ACCESS_TOKEN_KEY),
        read_raw(USERNAME_KEY),
        read_raw(ISSUED_AT_KEY),
    )?;
    if session.is_expired(Utc::now(), ttl) {
        web_sys::console::info_1(&"Stored session expired; signing out.".into());
        clear_session();
        return None;
    }
    Some(session)
}

/// Toggle markup tagged `data-auth-only` / `data-anon-only`.
fn apply_visibility(authenticated: bool) {
    dom::set_hidden_all("[data-auth-only]", !authenticated);
    dom::set_hidden_all("[data-anon-only]", authenticated);
}

/// POST credentials and decode the JSON reply. Error replies that still carry
/// a JSON body (e.g. `{"detail": ...}`) are returned as bodies.
async fn post_credentials<T: DeserializeOwned>(
    endpoint: &str,
    credentials: &Credentials,
) -> Result<T, MatjipError> {
    let resp = gloo_net::http::Request::post(endpoint)
        .json(credentials)
        .map_err(|e| MatjipError::Network(e.to_string()))?
        .send()
        .await
        .map_err(|e| MatjipError::Network(e.to_string()))?;

    match resp.json::<T>().await {
        Ok(body) => Ok(body),
        Err(_) if !resp.ok() => Err(MatjipError::Http {
            status: resp.status(),
        }),
        Err(e) => Err(MatjipError::Parse(e.to_string())),
    }
}

async fn login(
    endpoint: String,
    credentials: Credentials,
    session: RwSignal<Option<Session>>,
) {
    let resp = match post_credentials::<LoginResponse>(&endpoint, &credentials).await {
        Ok(resp) => resp,
        Err(e) => {
            web_sys::console::error_1(&format!("Login failed: {e}").into());
            dom::alert(&e.user_message());
            return;
        }
    };
    match Session::from_login(&credentials.username, &resp, Utc::now()) {
        Some(new_session) => {
            persist_session(&new_session);
            web_sys::console::log_1(&format!("Logged in as {}", new_session.username).into());
            let _ = session.try_set(Some(new_session));
        }
        None => {
            let detail = resp
                .detail
                .unwrap_or_else(|| "로그인에 실패했습니다.".to_string());
            dom::alert(&detail);
        }
    }
}

async fn signup(endpoint: String, credentials: Credentials) {
    match post_credentials::<SignupResponse>(&endpoint, &credentials).await {
        Ok(resp) => dom::alert(&resp.notice()),
        Err(e) => {
            web_sys::console::error_1(&format!("Signup failed: {e}").into());
            dom::alert(&e.user_message());
        }
    }
}

/// Sign out when the current session's lifetime runs out. Replacing the timer
/// cancels the previous one.
fn schedule_expiry(
    current: Option<&Session>,
    ttl: chrono::Duration,
    session: RwSignal<Option<Session>>,
) {
    let timer = current.map(|s| {
        let delay_ms = s
            .remaining(Utc::now(), ttl)
            .num_milliseconds()
            .clamp(0, i64::from(u32::MAX));
        Timeout::new(delay_ms as u32, move || {
            web_sys::console::info_1(&"Session expired; signing out.".into());
            clear_session();
            let _ = session.try_set(None);
            dom::alert("세션이 만료되었습니다. 다시 로그인해주세요.");
        })
    });
    SESSION_EXPIRY.with(|slot| *slot.borrow_mut() = timer);
}

fn logout(session: RwSignal<Option<Session>>) {
    clear_session();
    session.set(None);
    dom::alert("로그아웃 되었습니다.");
}

#[component]
pub fn AuthPanel() -> impl IntoView {
    let Config(config) = expect_context();
    let CurrentSession(session) = expect_context();
    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());

    let ttl = config.with_value(ClientConfig::session_ttl);
    Effect::new(move || {
        let authenticated = session.with(|current| {
            schedule_expiry(current.as_ref(), ttl, session);
            current.is_some()
        });
        apply_visibility(authenticated);
    });
    on_cleanup(|| {
        SESSION_EXPIRY.with(|slot| slot.borrow_mut().take());
    });

    let credentials = move || {
        let result = Credentials::new(&username.get_untracked(), &password.get_untracked());
        if let Err(e) = &result {
            dom::alert(&e.user_message());
        }
        result.ok()
    };

    let on_login = move |e: leptos::ev::SubmitEvent| {
        e.prevent_default();
        let Some(credentials) = credentials() else {
            return;
        };
        password.set(String::new());
        let endpoint = config.with_value(|c| c.login_endpoint.clone());
        spawn_local(login(endpoint, credentials, session));
    };

    let on_signup = move |_| {
        let Some(credentials) = credentials() else {
            return;
        };
        let endpoint = config.with_value(|c| c.signup_endpoint.clone());
        spawn_local(signup(endpoint, credentials));
    };

    move || match session.get() {
        Some(current) => view! {
            <div class="auth-panel" data-state="authenticated">
                <span id="welcomeMessage" class="welcome">{current.greeting()}</span>
                <button id="logoutButton" type="button" on:click=move |_| logout(session)>
                    "로그아웃"
                </button>
            </div>
        }
        .into_any(),
        None => view! {
            <form id="loginForm" class="auth-panel" data-state="anonymous" on:submit=on_login>
                <input
                    id="username"
                    type="text"
                    autocomplete="username"
                    placeholder="아이디"
                    prop:value=move || username.get()
                    on:input=move |e| username.set(event_target_value(&e))
                />
                <input
                    id="password"
                    type="password"
                    autocomplete="current-password"
                    placeholder="비밀번호"
                    prop:value=move || password.get()
                    on:input=move |e| password.set(event_target_value(&e))
                />
                <button type="submit">"로그인"</button>
                <button id="signupButton" type="button" on:click=on_signup>
                    "회원가입"
                </button>
            </form>
        }
        .into_any(),
    }
}
