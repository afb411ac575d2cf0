use crate::config::ProviderConfig;
use crate::providers::traits::CompletionProvider;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

#[derive(Clone)]
pub struct OllamaProvider {
    api_key: String,
    client: Client,
    config: ProviderConfig,
}

impl OllamaProvider {
    pub fn new(api_key: String, config: ProviderConfig) -> Self {
        Self {
            api_key,
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.config.model, prompt_chars = prompt.len(), "Sending Ollama chat request");

        let response = self
            .client
            .post(self.config.api_url.clone())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.config.timeout)
            .json(&json!({
                "model": self.config.model,
                "messages": [
                    {
                        "role": "user",
                        "content": prompt
                    }
                ],
                "stream": false
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!("API request failed: Status {}, Body: {}", status, error_text));
        }

        let response_json: Value = response.json().await?;

        if let Some(error) = response_json.get("error") {
            return Err(anyhow!("API returned error: {}", error));
        }

        Ok(response_json
            .get("message")
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .unwrap_or_default()
            .to_string())
    }
}
