use matjip_shared::BodyEncoding;
use matjip_shared::auth::DEFAULT_SESSION_TTL_MINUTES;
use matjip_shared::recommendation::DEFAULT_CARD_COUNT;
use matjip_shared::status::{DEFAULT_STATUS_INTERVAL_MS, DEFAULT_STATUS_MESSAGES};
use serde::Deserialize;

pub const SEARCH_ENDPOINT: &str = "/search/";
pub const GEOCODE_ENDPOINT: &str = "/geocode";
pub const LOGIN_ENDPOINT: &str = "/login/";
pub const SIGNUP_ENDPOINT: &str = "/signup/";

pub const SPEECH_LOCALE: &str = "ko-KR";
pub const MAP_ZOOM: u8 = 14;
pub const FIT_BOUNDS_PADDING_PX: u32 = 50;
pub const GEOLOCATION_TIMEOUT_MS: u32 = 10_000;

/// Id of the optional `<script type="application/json">` override block.
pub const CONFIG_ELEMENT_ID: &str = "matjip-config";

/// Runtime settings. Any field missing from the page override keeps its default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub search_endpoint: String,
    pub geocode_endpoint: String,
    pub login_endpoint: String,
    pub signup_endpoint: String,
    pub body_encoding: BodyEncoding,
    /// Ask for a separate region field (legacy two-field search form).
    pub require_region: bool,
    pub speech_locale: String,
    pub voice_auto_submit: bool,
    pub recommendation_count: usize,
    pub map_zoom: u8,
    pub fit_bounds_padding_px: u32,
    pub geolocation_timeout_ms: u32,
    pub status_interval_ms: u32,
    pub status_messages: Vec<String>,
    pub session_ttl_minutes: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            search_endpoint: SEARCH_ENDPOINT.to_string(),
            geocode_endpoint: GEOCODE_ENDPOINT.to_string(),
            login_endpoint: LOGIN_ENDPOINT.to_string(),
            signup_endpoint: SIGNUP_ENDPOINT.to_string(),
            body_encoding: BodyEncoding::Form,
            require_region: false,
            speech_locale: SPEECH_LOCALE.to_string(),
            voice_auto_submit: true,
            recommendation_count: DEFAULT_CARD_COUNT,
            map_zoom: MAP_ZOOM,
            fit_bounds_padding_px: FIT_BOUNDS_PADDING_PX,
            geolocation_timeout_ms: GEOLOCATION_TIMEOUT_MS,
            status_interval_ms: DEFAULT_STATUS_INTERVAL_MS,
            status_messages: DEFAULT_STATUS_MESSAGES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
        }
    }
}

impl ClientConfig {
    pub fn from_json(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|e| format!("parse error: {e}"))
    }

    /// Read the page override block, falling back to defaults.
    pub fn load() -> Self {
        let Some(raw) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content())
        else {
            return Self::default();
        };
        match Self::from_json(&raw) {
            Ok(config) => config,
            Err(e) => {
                web_sys::console::warn_1(
                    &format!("Ignoring #{CONFIG_ELEMENT_ID}: {e}").into(),
                );
                Self::default()
            }
        }
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_ttl_minutes.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_override_keeps_defaults() {
        assert_eq!(ClientConfig::from_json("{}").unwrap(), ClientConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = ClientConfig::from_json(
            r#"{ "body_encoding": "json", "voice_auto_submit": false, "map_zoom": 16 }"#,
        )
        .unwrap();
        assert_eq!(config.body_encoding, BodyEncoding::Json);
        assert!(!config.voice_auto_submit);
        assert_eq!(config.map_zoom, 16);
        assert_eq!(config.search_endpoint, "/search/");
        assert_eq!(config.recommendation_count, 4);
    }

    #[test]
    fn malformed_override_is_an_error() {
        assert!(ClientConfig::from_json("{ body_encoding: ").is_err());
        assert!(ClientConfig::from_json(r#"{ "body_encoding": "xml" }"#).is_err());
    }

    #[test]
    fn session_ttl_is_at_least_a_minute() {
        let config = ClientConfig {
            session_ttl_minutes: 0,
            ..ClientConfig::default()
        };
        assert_eq!(config.session_ttl(), chrono::Duration::minutes(1));
    }
}
