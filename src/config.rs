use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_FDA_API_URL: &str = "https://api.fda.gov/food/event.json";
pub const DEFAULT_USDA_API_URL: &str = "https://api.nal.usda.gov/fdc/v1";
pub const DEFAULT_OLLAMA_CHAT_URL: &str = "https://ollama.com/api/chat";
pub const DEFAULT_OLLAMA_MODEL: &str = "gpt-oss:20b-cloud";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL in {var}: {message}")]
    InvalidUrl { var: String, message: String },
    #[error("Invalid value for {var}: {value}")]
    InvalidNumber { var: String, value: String },
}

/// API keys read from the environment. Every key is optional at startup;
/// clients report a missing key when a request needs it.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub fdc_api_key: Option<String>,
    pub ollama_api_key: Option<String>,
    pub fda_api_key: Option<String>,
}

impl ApiKeys {
    pub fn from_env() -> Self {
        Self {
            fdc_api_key: non_blank_var("FDC_API_KEY"),
            ollama_api_key: non_blank_var("OLLAMA_API_KEY"),
            fda_api_key: non_blank_var("API_KEY"),
        }
    }

    /// Names of the variables that are not set.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.fdc_api_key.is_none() {
            missing.push("FDC_API_KEY");
        }
        if self.ollama_api_key.is_none() {
            missing.push("OLLAMA_API_KEY");
        }
        if self.fda_api_key.is_none() {
            missing.push("API_KEY");
        }
        missing
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_url: Url,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub keys: ApiKeys,
    pub fda_api_url: Url,
    pub usda_api_url: Url,
    pub http_timeout: Duration,
    pub ollama: ProviderConfig,
    pub session_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            keys: ApiKeys::default(),
            fda_api_url: Url::parse(DEFAULT_FDA_API_URL).expect("default FDA url is valid"),
            usda_api_url: Url::parse(DEFAULT_USDA_API_URL).expect("default USDA url is valid"),
            http_timeout: Duration::from_secs(30),
            ollama: ProviderConfig {
                api_url: Url::parse(DEFAULT_OLLAMA_CHAT_URL).expect("default Ollama url is valid"),
                model: DEFAULT_OLLAMA_MODEL.to_string(),
                timeout: Duration::from_secs(120),
            },
            session_capacity: 256,
        }
    }
}

impl AppConfig {
    /// Reads the configuration from the process environment. Call
    /// `dotenv().ok()` first to pick up a local `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_timeout = Duration::from_secs(number_var("HTTP_TIMEOUT_SECS", 30)?);

        Ok(Self {
            keys: ApiKeys::from_env(),
            fda_api_url: url_var("FDA_API_URL", DEFAULT_FDA_API_URL)?,
            usda_api_url: url_var("USDA_API_URL", DEFAULT_USDA_API_URL)?,
            http_timeout,
            ollama: ProviderConfig {
                api_url: url_var("OLLAMA_CHAT_URL", DEFAULT_OLLAMA_CHAT_URL)?,
                model: non_blank_var("OLLAMA_MODEL")
                    .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
                timeout: Duration::from_secs(number_var("OLLAMA_TIMEOUT_SECS", 120)?),
            },
            session_capacity: number_var("SESSION_CAPACITY", 256)?.max(1) as usize,
        })
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn url_var(name: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = non_blank_var(name).unwrap_or_else(|| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
        var: name.to_string(),
        message: e.to_string(),
    })
}

fn number_var(name: &str, default: u64) -> Result<u64, ConfigError> {
    match non_blank_var(name) {
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
            var: name.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_are_listed() {
        let keys = ApiKeys {
            fdc_api_key: Some("fdc".to_string()),
            ollama_api_key: None,
            fda_api_key: None,
        };
        assert_eq!(keys.missing(), vec!["OLLAMA_API_KEY", "API_KEY"]);
    }

    #[test]
    fn test_default_endpoints() {
        let config = AppConfig::default();
        assert_eq!(config.fda_api_url.as_str(), DEFAULT_FDA_API_URL);
        assert_eq!(config.ollama.model, DEFAULT_OLLAMA_MODEL);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }
}
