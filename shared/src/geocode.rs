use serde::{Deserialize, Serialize};

use crate::error::MatjipError;
use crate::location::Coordinates;

/// Coordinate component as returned by the geocoder: either a JSON number or
/// a numeric string (`"126.9780"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Component {
    Number(f64),
    Text(String),
}

impl Component {
    /// Parsed value; unparseable text becomes NaN and is rejected later.
    pub fn value(&self) -> f64 {
        match self {
            Self::Number(v) => *v,
            Self::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        }
    }
}

/// One geocoder match. `x` is longitude, `y` is latitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeAddress {
    pub x: Component,
    pub y: Component,
}

/// Body of `GET /geocode?address=...`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub addresses: Vec<GeocodeAddress>,
}

impl GeocodeResponse {
    /// Coordinates of the first match for `address`.
    pub fn first_coordinates(&self, address: &str) -> Result<Coordinates, MatjipError> {
        let Some(first) = self.addresses.first() else {
            return Err(MatjipError::GeocodeNotFound {
                address: address.to_string(),
            });
        };
        Coordinates::new(first.y.value(), first.x.value())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn city_hall_resolves_to_lat_lng() {
        let body = json!({ "addresses": [{ "x": "126.9780", "y": "37.5665" }] });
        let resp: GeocodeResponse = serde_json::from_value(body).unwrap();
        let coords = resp.first_coordinates("서울시청").unwrap();
        assert_eq!(coords.latitude, 37.5665);
        assert_eq!(coords.longitude, 126.9780);
    }

    #[test]
    fn numeric_components_are_accepted() {
        let body = json!({ "addresses": [
            { "x": 127.0276, "y": 37.4979, "roadAddress": "서울특별시 강남구 강남대로 396" },
            { "x": 0.0, "y": 0.0 }
        ] });
        let resp: GeocodeResponse = serde_json::from_value(body).unwrap();
        let coords = resp.first_coordinates("강남역").unwrap();
        assert_eq!((coords.latitude, coords.longitude), (37.4979, 127.0276));
    }

    #[test]
    fn empty_or_missing_addresses_is_not_found() {
        for body in [json!({ "addresses": [] }), json!({})] {
            let resp: GeocodeResponse = serde_json::from_value(body).unwrap();
            assert_eq!(
                resp.first_coordinates("없는주소"),
                Err(MatjipError::GeocodeNotFound {
                    address: "없는주소".into()
                })
            );
        }
    }

    #[test]
    fn non_numeric_components_are_invalid() {
        let body = json!({ "addresses": [{ "x": "east", "y": "37.5" }] });
        let resp: GeocodeResponse = serde_json::from_value(body).unwrap();
        assert!(matches!(
            resp.first_coordinates("x"),
            Err(MatjipError::InvalidCoordinates { .. })
        ));
    }
}
