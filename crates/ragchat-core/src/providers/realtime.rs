//! OpenAI Realtime ephemeral session creation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;

use super::openai::OpenAiConfig;
use super::{endpoint, RealtimeSessionProvider};

pub const DEFAULT_VOICE: &str = "alloy";
pub const TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Short-lived credential the browser uses to open the realtime connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSecret {
    pub value: String,
    #[serde(default)]
    pub expires_at: i64,
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    model: &'a str,
    voice: &'a str,
    instructions: &'a str,
    input_audio_transcription: Transcription,
}

#[derive(Serialize)]
struct Transcription {
    model: &'static str,
}

#[derive(Deserialize)]
struct SessionResponse {
    #[serde(default)]
    client_secret: Option<ClientSecret>,
}

#[derive(Debug, Clone)]
pub struct OpenAiRealtime {
    client: reqwest::Client,
    config: OpenAiConfig,
    model: String,
}

impl OpenAiRealtime {
    pub fn new(client: reqwest::Client, config: OpenAiConfig, model: impl Into<String>) -> Self {
        Self { client, config, model: model.into() }
    }
}

#[async_trait]
impl RealtimeSessionProvider for OpenAiRealtime {
    async fn create_session(&self, instructions: &str) -> Result<Option<ClientSecret>, ProviderError> {
        if self.config.api_key.is_empty() {
            return Err(ProviderError::NotConfigured("OPENAI_API_KEY"));
        }

        let body = SessionRequest {
            model: &self.model,
            voice: DEFAULT_VOICE,
            instructions,
            input_audio_transcription: Transcription { model: TRANSCRIPTION_MODEL },
        };

        let resp = self
            .client
            .post(endpoint(&self.config.base_url, "realtime/sessions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ProviderError::from_response("OpenAI Realtime", resp).await);
        }

        let parsed: SessionResponse = resp.json().await?;
        debug!(model = %self.model, granted = parsed.client_secret.is_some(), "realtime session response");
        Ok(parsed.client_secret)
    }
}
