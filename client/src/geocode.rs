use matjip_shared::{Coordinates, GeocodeResponse, MatjipError};

/// Resolve a street address through the backend geocoding proxy.
pub async fn lookup(endpoint: &str, address: &str) -> Result<Coordinates, MatjipError> {
    let encoded = js_sys::encode_uri_component(address)
        .as_string()
        .unwrap_or_default();
    let url = format!("{endpoint}?address={encoded}");

    let resp = gloo_net::http::Request::get(&url)
        .send()
        .await
        .map_err(|e| MatjipError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(MatjipError::Http {
            status: resp.status(),
        });
    }

    let body = resp
        .json::<GeocodeResponse>()
        .await
        .map_err(|e| MatjipError::Parse(e.to_string()))?;
    body.first_coordinates(address)
}
