use serde::{Deserialize, Serialize};

use crate::error::MatjipError;
use crate::location::Coordinates;

/// Body sent to the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SearchPayload {
    /// Single combined query; the backend extracts the region itself.
    Combined { search_input: String },
    /// Older two-field form.
    Legacy { query: String, region: String },
}

impl SearchPayload {
    pub fn combined(query: &str) -> Result<Self, MatjipError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(MatjipError::EmptyQuery);
        }
        Ok(Self::Combined {
            search_input: query.to_string(),
        })
    }

    pub fn legacy(query: &str, region: &str) -> Result<Self, MatjipError> {
        let (query, region) = (query.trim(), region.trim());
        if query.is_empty() {
            return Err(MatjipError::EmptyQuery);
        }
        if region.is_empty() {
            return Err(MatjipError::MissingRegion);
        }
        Ok(Self::Legacy {
            query: query.to_string(),
            region: region.to_string(),
        })
    }

    /// Field pairs for `application/x-www-form-urlencoded` submission.
    pub fn form_fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Combined { search_input } => vec![("search_input", search_input.as_str())],
            Self::Legacy { query, region } => {
                vec![("query", query.as_str()), ("region", region.as_str())]
            }
        }
    }
}

/// How the search body is encoded on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyEncoding {
    #[default]
    Form,
    Json,
}

/// How a successful search response should be consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Structured `{search_results: [...]}` rendered by the client.
    Structured,
    /// Markup that replaces the whole document body.
    Document,
}

impl ResponseKind {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let is_json = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|mime| {
                let mime = mime.trim().to_ascii_lowercase();
                mime == "application/json" || mime.ends_with("+json")
            })
            .unwrap_or(false);
        if is_json {
            Self::Structured
        } else {
            Self::Document
        }
    }
}

/// Structured search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub search_results: Vec<ResultItem>,
}

/// One search hit shown as a carousel slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, alias = "lat", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lng", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl ResultItem {
    /// Build an item from the `data-*` attributes of a server-rendered slide.
    pub fn from_slide_attributes(
        title: Option<String>,
        address: Option<String>,
        latitude: Option<&str>,
        longitude: Option<&str>,
    ) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|s| s.trim().parse::<f64>().ok());
        Self {
            title: title.unwrap_or_default(),
            address,
            latitude: parse(latitude),
            longitude: parse(longitude),
            ..Self::default()
        }
    }

    /// Coordinates carried directly by the item, if both are present and valid.
    pub fn direct_coordinates(&self) -> Option<Coordinates> {
        Coordinates::new(self.latitude?, self.longitude?).ok()
    }

    /// Address to geocode, if any non-blank one is present.
    pub fn geocode_address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn blank_query_is_rejected_before_any_payload_exists() {
        assert_eq!(SearchPayload::combined(""), Err(MatjipError::EmptyQuery));
        assert_eq!(SearchPayload::combined("  \t"), Err(MatjipError::EmptyQuery));
        assert_eq!(
            SearchPayload::legacy("고깃집", " "),
            Err(MatjipError::MissingRegion)
        );
        assert_eq!(
            SearchPayload::legacy("", "강남"),
            Err(MatjipError::EmptyQuery)
        );
    }

    #[test]
    fn combined_payload_encodings() {
        let payload = SearchPayload::combined("  홍대 데이트 코스 ").unwrap();
        assert_eq!(payload.form_fields(), vec![("search_input", "홍대 데이트 코스")]);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "search_input": "홍대 데이트 코스" })
        );
    }

    #[test]
    fn legacy_payload_encodings() {
        let payload = SearchPayload::legacy("고깃집", "강남").unwrap();
        assert_eq!(
            payload.form_fields(),
            vec![("query", "고깃집"), ("region", "강남")]
        );
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "query": "고깃집", "region": "강남" })
        );
    }

    #[test]
    fn content_type_routes_response() {
        assert_eq!(
            ResponseKind::from_content_type(Some("application/json")),
            ResponseKind::Structured
        );
        assert_eq!(
            ResponseKind::from_content_type(Some("Application/JSON; charset=utf-8")),
            ResponseKind::Structured
        );
        assert_eq!(
            ResponseKind::from_content_type(Some("application/problem+json")),
            ResponseKind::Structured
        );
        assert_eq!(
            ResponseKind::from_content_type(Some("text/html; charset=utf-8")),
            ResponseKind::Document
        );
        assert_eq!(ResponseKind::from_content_type(None), ResponseKind::Document);
    }

    #[test]
    fn parses_structured_results() {
        let body = json!({
            "search_results": [
                {
                    "title": "을지로 노가리 골목",
                    "description": "맥주와 노가리",
                    "link": "https://blog.example/1",
                    "address": "서울 중구 을지로13길"
                },
                { "name": "한강뷰 레스토랑", "lat": 37.52, "lng": 126.93 }
            ],
            "elapsed_ms": 812
        });
        let resp: SearchResponse = serde_json::from_value(body).unwrap();
        assert_eq!(resp.search_results.len(), 2);

        let first = &resp.search_results[0];
        assert_eq!(first.geocode_address(), Some("서울 중구 을지로13길"));
        assert_eq!(first.direct_coordinates(), None);

        let second = &resp.search_results[1];
        assert_eq!(second.title, "한강뷰 레스토랑");
        assert_eq!(
            second.direct_coordinates(),
            Some(Coordinates::new(37.52, 126.93).unwrap())
        );
    }

    #[test]
    fn slide_attributes_tolerate_garbage() {
        let item = ResultItem::from_slide_attributes(
            Some("종로 한식당".into()),
            Some("   ".into()),
            Some("NaN"),
            Some("126.98"),
        );
        assert_eq!(item.direct_coordinates(), None);
        assert_eq!(item.geocode_address(), None);

        let item = ResultItem::from_slide_attributes(None, None, Some(" 37.57 "), Some("126.98"));
        assert_eq!(
            item.direct_coordinates(),
            Some(Coordinates::new(37.57, 126.98).unwrap())
        );
    }
}
