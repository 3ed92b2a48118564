use thiserror::Error;

/// Every failure the client can surface, grouped by how it is reported:
/// input errors are alerted, transport errors are alerted and logged,
/// data errors abandon a single map slot, capability gaps are silent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatjipError {
    #[error("search query is empty")]
    EmptyQuery,
    #[error("search region is empty")]
    MissingRegion,
    #[error("username or password is empty")]
    EmptyCredentials,
    #[error("fetch error: {0}")]
    Network(String),
    #[error("HTTP {status}")]
    Http { status: u16 },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("no geocode match for {address:?}")]
    GeocodeNotFound { address: String },
    #[error("invalid coordinates (lat={latitude}, lng={longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
    #[error("result has neither coordinates nor an address")]
    MissingAddress,
    #[error("map SDK error: {0}")]
    MapSdk(String),
    #[error("element #{0} not found")]
    MissingElement(String),
    #[error("{0} is not available in this browser")]
    Unsupported(&'static str),
}

impl MatjipError {
    /// Message shown to the user in a blocking notice.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyQuery => "검색어를 입력해주세요!".to_string(),
            Self::MissingRegion => "검색어와 지역을 입력해주세요!".to_string(),
            Self::EmptyCredentials => "아이디와 비밀번호를 입력해주세요.".to_string(),
            Self::Network(_) | Self::Http { .. } | Self::Parse(_) => {
                format!("Error: {self}")
            }
            Self::GeocodeNotFound { .. } | Self::InvalidCoordinates { .. } => {
                "위치 정보를 찾을 수 없습니다.".to_string()
            }
            Self::MissingAddress => "주소 정보가 없습니다.".to_string(),
            Self::MapSdk(_) => "지도를 불러오지 못했습니다.".to_string(),
            Self::MissingElement(_) => "화면 요소를 찾을 수 없습니다.".to_string(),
            Self::Unsupported(_) => "지원되지 않는 브라우저입니다.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MatjipError;

    #[test]
    fn transport_errors_carry_detail_into_user_message() {
        let err = MatjipError::Http { status: 502 };
        assert_eq!(err.user_message(), "Error: HTTP 502");

        let err = MatjipError::Network("connection refused".into());
        assert_eq!(err.user_message(), "Error: fetch error: connection refused");
    }
}
