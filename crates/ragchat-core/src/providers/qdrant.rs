//! Qdrant point search over its REST API.

use async_trait::async_trait;
use ragchat_types::RetrievedChunk;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;
use crate::rag::RetrievalOptions;

use super::VectorIndex;

/// Payload field holding the chunk text.
pub const TEXT_FIELD: &str = "text";

#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    params: SearchParams,
    with_payload: bool,
}

#[derive(Serialize)]
struct SearchParams {
    hnsw_ef: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    #[serde(default)]
    payload: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub struct QdrantIndex {
    client: reqwest::Client,
    config: QdrantConfig,
}

impl QdrantIndex {
    pub fn new(client: reqwest::Client, config: QdrantConfig) -> Self {
        Self { client, config }
    }

    /// `{url}/collections/{collection}/points/search`, with the collection
    /// name percent-encoded as a single path segment.
    fn search_url(&self) -> Result<Url, ProviderError> {
        let invalid = |message: String| ProviderError::InvalidUrl {
            url: self.config.url.clone(),
            message,
        };
        let mut url = Url::parse(&self.config.url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base URL".to_owned()))?
            .pop_if_empty()
            .extend(["collections", self.config.collection.as_str(), "points", "search"]);
        Ok(url)
    }
}

/// Project matches to chunks, in the order Qdrant ranked them.
fn into_chunks(resp: SearchResponse) -> Vec<RetrievedChunk> {
    resp.result
        .into_iter()
        .filter_map(|point| {
            let text = point.payload?.get(TEXT_FIELD)?.as_str()?.to_owned();
            Some(RetrievedChunk { text })
        })
        .collect()
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn search(
        &self,
        vector: &[f32],
        options: &RetrievalOptions,
    ) -> Result<Vec<RetrievedChunk>, ProviderError> {
        if self.config.url.is_empty() {
            return Err(ProviderError::NotConfigured("QDRANT_URL"));
        }

        let url = self.search_url()?;
        let body = SearchRequest {
            vector,
            limit: options.top_k,
            params: SearchParams { hnsw_ef: options.hnsw_ef },
            with_payload: true,
        };

        let mut req = self.client.post(url).json(&body);
        if let Some(key) = &self.config.api_key {
            req = req.header("api-key", key);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(ProviderError::from_response("Qdrant", resp).await);
        }

        let chunks = into_chunks(resp.json().await?);
        debug!(collection = %self.config.collection, matches = chunks.len(), "vector search done");
        Ok(chunks)
    }
}
