use crate::error::ClientError;
use reqwest::header::HeaderValue;

/// Header carrying the project API key.
pub const API_KEY_HEADER: &str = "apikey";
/// Header selecting the schema that GET requests read from.
pub const ACCEPT_PROFILE_HEADER: &str = "Accept-Profile";

/// Builds the static header set for a session.
///
/// The key goes out twice: as `apikey` for the gateway and as a bearer token
/// for the database role. The schema is chosen per session with
/// `Accept-Profile`; the endpoint stays the same.
///
/// Keys and schemas that cannot travel in an HTTP header are rejected here,
/// before any request is made.
pub fn session_headers(api_key: &str, schema: &str) -> Result<Vec<(String, String)>, ClientError> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(ClientError::Configuration("API key must not be empty".to_string()));
    }
    if schema.trim().is_empty() {
        return Err(ClientError::Configuration("schema name must not be empty".to_string()));
    }

    HeaderValue::from_str(api_key).map_err(|_| {
        ClientError::Configuration("API key contains characters not allowed in a header".to_string())
    })?;
    HeaderValue::from_str(schema).map_err(|_| {
        ClientError::Configuration(format!("schema name '{}' is not a valid header value", schema))
    })?;

    Ok(vec![
        (API_KEY_HEADER.to_string(), api_key.to_string()),
        ("Authorization".to_string(), format!("Bearer {}", api_key)),
        (ACCEPT_PROFILE_HEADER.to_string(), schema.to_string()),
        ("Accept".to_string(), "application/json".to_string()),
    ])
}
