use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MatjipError;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const USERNAME_KEY: &str = "username";
pub const ISSUED_AT_KEY: &str = "access_token_issued_at";

/// Backend tokens are minted with a 30 minute lifetime.
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 30;

/// Body of `POST /login/` and `POST /signup/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Result<Self, MatjipError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(MatjipError::EmptyCredentials);
        }
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl SignupResponse {
    pub fn notice(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.detail.clone())
            .unwrap_or_else(|| "회원가입 요청이 처리되었습니다.".to_string())
    }
}

/// A locally persisted login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub issued_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Session from a login response, if it carries a non-empty token.
    pub fn from_login(username: &str, resp: &LoginResponse, now: DateTime<Utc>) -> Option<Self> {
        let token = resp.access_token.as_deref().filter(|t| !t.is_empty())?;
        Some(Self {
            token: token.to_string(),
            username: username.to_string(),
            issued_at: Some(now),
        })
    }

    /// Rebuild from raw storage values. Both token and username must be
    /// present and non-empty; an unparseable timestamp counts as missing.
    pub fn from_stored(
        token: Option<String>,
        username: Option<String>,
        issued_at: Option<String>,
    ) -> Option<Self> {
        let token = token.filter(|t| !t.is_empty())?;
        let username = username.filter(|u| !u.is_empty())?;
        let issued_at = issued_at
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|dt| dt.with_timezone(&Utc));
        Some(Self {
            token,
            username,
            issued_at,
        })
    }

    /// End of the session's lifetime. `None` for undated sessions.
    pub fn expires_at(&self, ttl: Duration) -> Option<DateTime<Utc>> {
        self.issued_at.map(|issued| issued + ttl)
    }

    /// Undated sessions predate the expiry policy and are treated as expired.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.expires_at(ttl).is_none_or(|end| now >= end)
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self, now: DateTime<Utc>, ttl: Duration) -> Duration {
        self.expires_at(ttl)
            .map(|end| (end - now).max(Duration::zero()))
            .unwrap_or_else(Duration::zero)
    }

    pub fn greeting(&self) -> String {
        format!("{}님, 환영합니다!", self.username)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 1, 12, minute, 0).unwrap()
    }

    #[test]
    fn credentials_require_both_fields() {
        assert_eq!(Credentials::new(" ", "pw"), Err(MatjipError::EmptyCredentials));
        assert_eq!(Credentials::new("kim", ""), Err(MatjipError::EmptyCredentials));
        let c = Credentials::new(" kim ", "pw").unwrap();
        assert_eq!(
            serde_json::to_value(&c).unwrap(),
            json!({ "username": "kim", "password": "pw" })
        );
    }

    #[test]
    fn login_with_token_creates_session() {
        let resp: LoginResponse =
            serde_json::from_value(json!({ "access_token": "abc.def", "token_type": "bearer" }))
                .unwrap();
        let session = Session::from_login("kim", &resp, at(0)).unwrap();
        assert_eq!(session.token, "abc.def");
        assert_eq!(session.greeting(), "kim님, 환영합니다!");
    }

    #[test]
    fn login_failure_has_no_session() {
        let resp: LoginResponse =
            serde_json::from_value(json!({ "detail": "잘못된 사용자명 또는 비밀번호입니다." }))
                .unwrap();
        assert!(Session::from_login("kim", &resp, at(0)).is_none());
        assert_eq!(
            resp.detail.as_deref(),
            Some("잘못된 사용자명 또는 비밀번호입니다.")
        );
    }

    #[test]
    fn stored_session_needs_token_and_username() {
        assert!(Session::from_stored(Some("t".into()), None, None).is_none());
        assert!(Session::from_stored(None, Some("kim".into()), None).is_none());
        assert!(Session::from_stored(Some("".into()), Some("kim".into()), None).is_none());

        let s = Session::from_stored(
            Some("t".into()),
            Some("kim".into()),
            Some(at(5).to_rfc3339()),
        )
        .unwrap();
        assert_eq!(s.issued_at, Some(at(5)));
    }

    #[test]
    fn expiry_policy() {
        let ttl = Duration::minutes(DEFAULT_SESSION_TTL_MINUTES);
        let fresh = Session {
            token: "t".into(),
            username: "kim".into(),
            issued_at: Some(at(0)),
        };
        assert!(!fresh.is_expired(at(29), ttl));
        assert!(fresh.is_expired(at(30), ttl));

        let undated = Session {
            issued_at: None,
            ..fresh
        };
        assert!(undated.is_expired(at(0), ttl));
    }

    #[test]
    fn session_opened_on_the_page_runs_out() {
        let ttl = Duration::minutes(DEFAULT_SESSION_TTL_MINUTES);
        let resp = LoginResponse {
            access_token: Some("abc.def".into()),
            detail: None,
        };
        let session = Session::from_login("kim", &resp, at(10)).unwrap();
        assert_eq!(session.expires_at(ttl), Some(at(40)));
        assert_eq!(session.remaining(at(25), ttl), Duration::minutes(15));
        assert_eq!(session.remaining(at(45), ttl), Duration::zero());
        assert!(session.is_expired(at(40), ttl));

        let undated = Session {
            issued_at: None,
            ..session
        };
        assert_eq!(undated.remaining(at(10), ttl), Duration::zero());
    }

    #[test]
    fn signup_notice_prefers_message() {
        let ok: SignupResponse =
            serde_json::from_value(json!({ "message": "회원가입 성공", "user": "kim" })).unwrap();
        assert_eq!(ok.notice(), "회원가입 성공");
        let dup: SignupResponse =
            serde_json::from_value(json!({ "detail": "이미 존재하는 사용자입니다." })).unwrap();
        assert_eq!(dup.notice(), "이미 존재하는 사용자입니다.");
    }
}
