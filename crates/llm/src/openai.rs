//! [`TextService`] over `POST {base_url}/chat/completions`.

use std::time::Instant;

use async_trait::async_trait;
use pipeline::{Completion, ModelSettings, Prompt, ServiceError, TextService, TokenUsage};
use reqwest::{header, Client};
use tracing::{debug, warn};

use crate::config::OpenAiConfig;
use crate::wire::{ChatRequest, ChatResponse, ErrorEnvelope};

/// OpenAI chat-completions client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    http_client: Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    /// Creates a provider with a default HTTP client.
    pub fn new(config: OpenAiConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Creates a provider around an existing HTTP client.
    pub fn with_client(http_client: Client, config: OpenAiConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// The configuration this provider was built with.
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

#[async_trait]
impl TextService for OpenAiProvider {
    async fn complete(
        &self,
        prompt: &Prompt,
        settings: &ModelSettings,
    ) -> Result<Completion, ServiceError> {
        let request = ChatRequest {
            model: &settings.model,
            messages: &prompt.messages,
            temperature: settings.temperature.as_f32(),
        };

        debug!(
            model = %settings.model,
            messages = prompt.messages.len(),
            "Sending chat completion request"
        );

        let started = Instant::now();
        let response = self
            .http_client
            .post(self.endpoint())
            .header(header::AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            warn!(status = status.as_u16(), error = %message, "Chat completion rejected");
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await.map_err(|e| ServiceError::Decode {
            message: e.to_string(),
        })?;
        let usage = body.usage.map(TokenUsage::from);
        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ServiceError::EmptyResponse)?;

        debug!(
            model = %settings.model,
            duration_ms = started.elapsed().as_millis() as u64,
            total_tokens = usage.map(|u| u.total.as_u64()),
            "Chat completion received"
        );

        Ok(Completion { text, usage })
    }
}
