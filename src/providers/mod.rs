pub mod ollama;
pub mod traits;
