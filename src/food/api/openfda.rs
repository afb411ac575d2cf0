use crate::config::AppConfig;
use crate::food::api::{read_json, string_or_number};
use crate::food::error::{blank_error, FetchError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "date_created:desc")]
    Newest,
    #[serde(rename = "date_created:asc")]
    Oldest,
}

impl SortOrder {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Newest => "date_created:desc",
            SortOrder::Oldest => "date_created:asc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Newest => "Newest first",
            SortOrder::Oldest => "Oldest first",
        }
    }
}

fn validate_industry(industry: &str) -> Result<(), ValidationError> {
    if industry.trim().is_empty() {
        return Err(blank_error("Please enter an industry name (e.g. Cosmetics)."));
    }
    Ok(())
}

#[derive(Debug, Clone, Validate)]
pub struct EventQuery {
    #[validate(custom = "validate_industry")]
    pub industry: String,
    #[validate(range(min = 1, max = 1000, message = "Max records must be between 1 and 1000."))]
    pub limit: i64,
    pub sort: SortOrder,
    pub api_key: Option<String>,
}

impl EventQuery {
    pub fn new(industry: impl Into<String>, limit: i64, sort: SortOrder) -> Self {
        Self {
            industry: industry.into(),
            limit,
            sort,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self
    }

    /// The openFDA search expression for the product industry name.
    pub fn search_expression(&self) -> String {
        format!("products.industry_name:\"{}\"", self.industry.trim())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Product {
    #[serde(default)]
    pub name_brand: Option<String>,
    #[serde(default)]
    pub industry_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub industry_code: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Consumer {
    #[serde(default, deserialize_with = "string_or_number")]
    pub age: Option<String>,
    #[serde(default)]
    pub age_unit: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// One adverse event report as returned by the food event endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AdverseEvent {
    #[serde(default, deserialize_with = "string_or_number")]
    pub report_number: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub date_created: Option<String>,
    #[serde(default)]
    pub outcomes: Vec<String>,
    #[serde(default)]
    pub reactions: Vec<String>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub consumer: Option<Consumer>,
}

#[derive(Debug, Default, Deserialize)]
struct MetaResults {
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    #[serde(default)]
    results: Option<MetaResults>,
}

#[derive(Debug, Deserialize)]
struct EventResponse {
    #[serde(default)]
    meta: Option<Meta>,
    #[serde(default)]
    results: Vec<AdverseEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    /// Total matching reports according to the API, when reported.
    pub total: Option<u64>,
    pub returned: usize,
}

impl EventSummary {
    pub fn describe(&self) -> String {
        let total = self
            .total
            .map(|t| t.to_string())
            .unwrap_or_else(|| "?".to_string());
        format!("Total matching (API): {}  ·  Returned: {}", total, self.returned)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventResult {
    pub events: Vec<AdverseEvent>,
    pub summary: EventSummary,
}

#[derive(Debug, Clone)]
pub struct OpenFdaClient {
    client: Client,
    base_url: Url,
    default_api_key: Option<String>,
    timeout: Duration,
}

impl OpenFdaClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.fda_api_url.clone(),
            default_api_key: config.keys.fda_api_key.clone(),
            timeout: config.http_timeout,
        }
    }

    /// Runs one adverse event query. The key on the query wins over the
    /// configured `API_KEY`; without either the request goes out unkeyed.
    pub async fn fetch_events(&self, query: &EventQuery) -> Result<EventResult, FetchError> {
        query.validate()?;

        let mut params = vec![
            ("search", query.search_expression()),
            ("sort", query.sort.as_param().to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(key) = query.api_key.as_ref().or(self.default_api_key.as_ref()) {
            params.push(("api_key", key.clone()));
        }

        info!(
            industry = %query.industry.trim(),
            limit = query.limit,
            sort = query.sort.as_param(),
            "Querying openFDA food events"
        );

        let response = self
            .client
            .get(self.base_url.clone())
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await?;

        let body = read_json(response).await?;
        let parsed: EventResponse =
            serde_json::from_value(body).map_err(|_| FetchError::InvalidJson)?;

        let total = parsed
            .meta
            .and_then(|m| m.results)
            .and_then(|r| r.total);
        let summary = EventSummary {
            total,
            returned: parsed.results.len(),
        };
        debug!(?summary, "openFDA query complete");

        Ok(EventResult {
            events: parsed.results,
            summary,
        })
    }
}
