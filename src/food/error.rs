use thiserror::Error;

/// A failed fetch. Every variant carries a message fit to show in place
/// of a results table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    Validation(String),
    #[error("Request timed out. Check your network and try again.")]
    Timeout,
    #[error("HTTP error: {status} – {reason}")]
    Http { status: u16, reason: String },
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Invalid JSON in API response.")]
    InvalidJson,
    #[error("{0}")]
    Api(String),
    #[error("{0}")]
    Generation(String),
}

impl FetchError {
    pub fn config(msg: impl Into<String>) -> Self {
        FetchError::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        FetchError::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FetchError::Validation(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, FetchError::Config(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::InvalidJson
        } else if let Some(status) = err.status() {
            FetchError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            }
        } else {
            FetchError::Request(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for FetchError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.keys().copied().collect();
        fields.sort_unstable();

        let message = fields
            .first()
            .and_then(|field| field_errors.get(field))
            .and_then(|errs| errs.first())
            .map(|err| match &err.message {
                Some(msg) => msg.to_string(),
                None => format!("Invalid value ({})", err.code),
            })
            .unwrap_or_else(|| "Invalid input.".to_string());
        FetchError::Validation(message)
    }
}

/// Builds a `ValidationError` for a blank required field.
pub(crate) fn blank_error(message: &'static str) -> validator::ValidationError {
    let mut err = validator::ValidationError::new("blank");
    err.message = Some(message.into());
    err
}

/// Pulls `error.message` out of an API error body such as
/// `{"error": {"code": "NOT_FOUND", "message": "No matches found!"}}`.
pub(crate) fn api_error_message(body: &serde_json::Value) -> Option<String> {
    let error = body.get("error")?;
    Some(
        error
            .get("message")
            .and_then(|m| m.as_str())
            .or_else(|| error.as_str())
            .unwrap_or("Unknown API error.")
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_error_message() {
        let err = FetchError::Http { status: 500, reason: "Internal Server Error".to_string() };
        assert_eq!(err.to_string(), "HTTP error: 500 – Internal Server Error");
    }

    #[test]
    fn test_api_error_message() {
        let body = json!({"error": {"code": "NOT_FOUND", "message": "No matches found!"}});
        assert_eq!(api_error_message(&body).as_deref(), Some("No matches found!"));

        let body = json!({"error": {"code": "BAD_REQUEST"}});
        assert_eq!(api_error_message(&body).as_deref(), Some("Unknown API error."));

        assert_eq!(api_error_message(&json!({"results": []})), None);
    }
}
