pub mod openfda;
pub mod usda;

// Re-export common types
pub use openfda::OpenFdaClient;
pub use usda::UsdaClient;

use crate::food::error::{api_error_message, FetchError};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads a response body as JSON. A non-success status is reported with the
/// API's own error message when the body carries one.
pub(crate) async fn read_json(response: reqwest::Response) -> Result<Value, FetchError> {
    let status = response.status();
    let text = response.text().await?;
    let body = serde_json::from_str::<Value>(&text);

    if !status.is_success() {
        if let Some(message) = body.as_ref().ok().and_then(api_error_message) {
            return Err(FetchError::Api(message));
        }
        return Err(FetchError::Http {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        });
    }

    let body = body.map_err(|_| FetchError::InvalidJson)?;
    if let Some(message) = api_error_message(&body) {
        return Err(FetchError::Api(message));
    }
    Ok(body)
}

/// Accepts `"52"`, `52` or `52.0` and keeps it as text.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accepts a number or a numeric string.
pub(crate) fn safe_float(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
