//! Gemini embeddings over the Generative Language REST API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;

use super::{endpoint, EmbeddingProvider};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const RETRIEVAL_DOCUMENT: &str = "RETRIEVAL_DOCUMENT";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    /// Model id without the `models/` prefix, e.g. `text-embedding-004`.
    pub model: String,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
    model: String,
    content: Content<'a>,
    task_type: &'static str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<Embedding>,
}

#[derive(Deserialize)]
struct Embedding {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct GeminiEmbedder {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiEmbedder {
    pub fn new(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    fn request_body<'a>(&self, text: &'a str) -> BatchEmbedRequest<'a> {
        BatchEmbedRequest {
            requests: vec![EmbedRequest {
                model: format!("models/{}", self.config.model),
                content: Content { parts: vec![Part { text }] },
                task_type: RETRIEVAL_DOCUMENT,
            }],
        }
    }
}

/// Drop empty vectors so "no embedding" has a single representation.
fn into_vectors(resp: BatchEmbedResponse) -> Vec<Vec<f32>> {
    resp.embeddings
        .into_iter()
        .map(|e| e.values)
        .filter(|v| !v.is_empty())
        .collect()
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<Vec<f32>>, ProviderError> {
        if self.config.api_key.is_empty() {
            return Err(ProviderError::NotConfigured("GEMINI_API_KEY"));
        }

        let url = endpoint(
            &self.config.base_url,
            &format!("models/{}:batchEmbedContents", self.config.model),
        );

        let resp = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&self.request_body(text))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ProviderError::from_response("Gemini", resp).await);
        }

        let vectors = into_vectors(resp.json().await?);
        debug!(count = vectors.len(), "embeddings received");
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedder() -> GeminiEmbedder {
        GeminiEmbedder::new(
            reqwest::Client::new(),
            GeminiConfig {
                api_key: "k".into(),
                base_url: DEFAULT_BASE_URL.into(),
                model: "text-embedding-004".into(),
            },
        )
    }

    #[test]
    fn request_uses_retrieval_document_task() {
        let body = serde_json::to_value(embedder().request_body("what is rust")).unwrap();
        let req = &body["requests"][0];
        assert_eq!(req["taskType"], "RETRIEVAL_DOCUMENT");
        assert_eq!(req["model"], "models/text-embedding-004");
        assert_eq!(req["content"]["parts"][0]["text"], "what is rust");
    }

    #[test]
    fn missing_embeddings_field_means_no_vectors() {
        let resp: BatchEmbedResponse = serde_json::from_str("{}").unwrap();
        assert!(into_vectors(resp).is_empty());
    }

    #[test]
    fn empty_vectors_are_dropped() {
        let resp: BatchEmbedResponse =
            serde_json::from_str(r#"{"embeddings":[{"values":[]},{"values":[0.5,0.25]}]}"#).unwrap();
        assert_eq!(into_vectors(resp), vec![vec![0.5, 0.25]]);
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let mut e = embedder();
        e.config.api_key.clear();
        assert!(matches!(e.embed("x").await, Err(ProviderError::NotConfigured(_))));
    }
}
