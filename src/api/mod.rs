use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::food::api::{OpenFdaClient, UsdaClient};
use crate::food::error::FetchError;
use crate::food::finder::RecipeFinder;
use crate::llm::chef::ChefAssistant;
use crate::providers::ollama::ollama::OllamaProvider;
use crate::providers::traits::CompletionProvider;

pub mod chef;
pub mod fda;
pub mod html;
pub mod session;

use session::{session_layer, SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub fda: OpenFdaClient,
    pub usda: UsdaClient,
    provider: Option<Arc<dyn CompletionProvider + Send + Sync>>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let provider = config.keys.ollama_api_key.clone().map(|key| {
            Arc::new(OllamaProvider::new(key, config.ollama.clone()))
                as Arc<dyn CompletionProvider + Send + Sync>
        });
        Self {
            fda: OpenFdaClient::new(&config),
            usda: UsdaClient::new(&config),
            sessions: SessionStore::new(config.session_capacity),
            provider,
            config: Arc::new(config),
        }
    }

    /// Replaces the configured text generator.
    pub fn with_provider(mut self, provider: Arc<dyn CompletionProvider + Send + Sync>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// A chef over the key typed into the form, or the configured provider.
    pub fn chef(&self, key_override: Option<&str>) -> ChefAssistant {
        match key_override.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => ChefAssistant::new(Some(Arc::new(OllamaProvider::new(
                key.to_string(),
                self.config.ollama.clone(),
            )))),
            None => ChefAssistant::new(self.provider.clone()),
        }
    }

    pub fn finder(&self, key_override: Option<&str>) -> RecipeFinder {
        RecipeFinder::new(self.chef(key_override), self.usda.clone())
    }

    /// Logs, once, each key the apps will be missing.
    pub fn log_missing_keys(&self) {
        for key in self.config.keys.missing() {
            warn!("{} is not set; requests that need it will show a configuration error", key);
        }
    }
}

#[derive(Serialize)]
pub struct ApiResponse {
    status: String,
}

/// JSON rendering of a failed fetch.
pub struct JsonError(pub FetchError);

impl From<FetchError> for JsonError {
    fn from(err: FetchError) -> Self {
        JsonError(err)
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            FetchError::Validation(_) => StatusCode::BAD_REQUEST,
            FetchError::Config(msg) => {
                error!("Configuration error: {}", msg);
                StatusCode::SERVICE_UNAVAILABLE
            }
            FetchError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            other => {
                warn!("Upstream API error: {}", other);
                StatusCode::BAD_GATEWAY
            }
        };
        (status, Json(ApiResponse { status: self.0.to_string() })).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, JsonError>;

async fn health_check() -> Response {
    Json(ApiResponse {
        status: "Server is running and healthy".to_string(),
    })
    .into_response()
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600))
}

/// The FDA Food Adverse Event explorer.
pub fn fda_router(state: AppState) -> Router {
    info!("Configuring FDA explorer routes");
    Router::new()
        .route("/", get(fda::index))
        .route("/query", post(fda::run_query))
        .route("/about", get(fda::about))
        .route("/api/events", get(fda::events_json).layer(cors()))
        .route("/health", get(health_check))
        .layer(session_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The Smart Chef recipe and nutrition app.
pub fn chef_router(state: AppState) -> Router {
    info!("Configuring Smart Chef routes");
    Router::new()
        .route("/", get(chef::index))
        .route("/recipes", post(chef::find_recipes))
        .route("/recipes/generate", post(chef::generate_recipe))
        .route("/back", post(chef::back_to_table))
        .route("/recipe.md", get(chef::download_recipe))
        .route("/report", post(chef::nutrition_report))
        .route("/about", get(chef::about))
        .route("/api/nutrition", get(chef::nutrition_json).layer(cors()))
        .route("/health", get(health_check))
        .layer(session_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
