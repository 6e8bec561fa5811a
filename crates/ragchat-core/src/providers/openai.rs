//! OpenAI-compatible streaming chat completions.

use async_trait::async_trait;
use ragchat_types::Message;
use serde::Serialize;
use tracing::debug;

use crate::error::ProviderError;

use super::{endpoint, sse, ChatCompletionProvider, DeltaStream};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

#[derive(Debug, Clone)]
pub struct OpenAiChat {
    client: reqwest::Client,
    config: OpenAiConfig,
    model: String,
}

impl OpenAiChat {
    pub fn new(client: reqwest::Client, config: OpenAiConfig, model: impl Into<String>) -> Self {
        Self { client, config, model: model.into() }
    }
}

#[async_trait]
impl ChatCompletionProvider for OpenAiChat {
    async fn stream_chat(&self, messages: &[Message]) -> Result<DeltaStream, ProviderError> {
        let body = CompletionRequest { model: &self.model, messages, stream: true };

        let mut req = self
            .client
            .post(endpoint(&self.config.base_url, "chat/completions"))
            .header("Accept", "text/event-stream")
            .json(&body);

        if !self.config.api_key.is_empty() {
            req = req.bearer_auth(&self.config.api_key);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(ProviderError::from_response("OpenAI", resp).await);
        }

        debug!(model = %self.model, messages = messages.len(), "completion stream opened");
        Ok(sse::delta_stream(resp.bytes_stream()))
    }
}
