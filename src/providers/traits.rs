use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Sends one prompt and returns the generated text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
