pub mod api;
pub mod commands;
pub mod config;
pub mod food;
pub mod llm;
pub mod providers;

// Re-export commonly used items
pub use api::AppState;
pub use config::AppConfig;
pub use food::error::FetchError;
