//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use ragchat_core::providers::gemini::{GeminiConfig, GeminiEmbedder};
use ragchat_core::providers::openai::{OpenAiChat, OpenAiConfig};
use ragchat_core::providers::qdrant::{QdrantConfig, QdrantIndex};
use ragchat_core::providers::realtime::OpenAiRealtime;
use ragchat_core::providers::supabase::{SupabaseClient, SupabaseConfig};
use ragchat_core::providers;
use ragchat_core::{ProviderError, RagPipeline, RetrievalOptions, SessionIssuer};

use crate::config::Config;

/// State shared across all HTTP handlers. Read-only after startup.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Embed → search → stream pipeline behind `/api/chat-response`.
    pub rag: Arc<RagPipeline>,
    /// Auth + credit gate behind `/api/openai-session`.
    pub sessions: Arc<SessionIssuer>,
}

impl AppState {
    /// Wire the production vendor clients from `config`.
    pub fn from_config(config: Config) -> Result<Self, ProviderError> {
        let client = providers::http_client(config.connect_timeout)?;

        let openai = OpenAiConfig {
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.clone(),
        };

        let rag = RagPipeline::new(
            Arc::new(GeminiEmbedder::new(
                client.clone(),
                GeminiConfig {
                    api_key: config.gemini_api_key.clone(),
                    base_url: config.gemini_base_url.clone(),
                    model: config.embedding_model.clone(),
                },
            )),
            Arc::new(QdrantIndex::new(
                client.clone(),
                QdrantConfig {
                    url: config.qdrant_url.clone(),
                    api_key: config.qdrant_api_key.clone(),
                    collection: config.qdrant_collection.clone(),
                },
            )),
            Arc::new(OpenAiChat::new(client.clone(), openai.clone(), config.chat_model.clone())),
        )
        .with_options(RetrievalOptions {
            top_k: config.retrieval_top_k,
            hnsw_ef: config.retrieval_hnsw_ef,
        });

        let supabase = Arc::new(SupabaseClient::new(
            client.clone(),
            SupabaseConfig {
                url: config.supabase_url.clone(),
                service_key: config.supabase_service_key.clone(),
            },
        ));
        let sessions = SessionIssuer::new(
            supabase.clone(),
            supabase,
            Arc::new(OpenAiRealtime::new(client, openai, config.realtime_model.clone())),
        );

        Ok(Self {
            config: Arc::new(config),
            rag: Arc::new(rag),
            sessions: Arc::new(sessions),
        })
    }
}
