//! Retrieval-augmented chat pipeline.
//!
//! One linear pass per request:
//! 1. embed the content of the last message,
//! 2. search the vector index with that embedding,
//! 3. build a new conversation whose last message carries the context,
//! 4. open a streaming completion and hand back its deltas.
//!
//! Retrieval failures degrade to an empty context; only the completion
//! call can fail the request.

use std::sync::Arc;

use ragchat_types::{join_context, Message};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::ProviderError;
use crate::providers::{ChatCompletionProvider, EmbeddingProvider, VectorIndex};

pub use crate::providers::DeltaStream;

/// Appended to the last message, followed by the retrieved context.
pub const CONTEXT_INSTRUCTION: &str = "\n\nAnswer using the context provided below.\n\nContext:\n";

/// Vector search knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalOptions {
    /// Number of nearest neighbours to fetch.
    pub top_k: usize,
    /// HNSW search breadth; higher is slower and more accurate.
    pub hnsw_ef: usize,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self { top_k: 5, hnsw_ef: 128 }
    }
}

#[derive(Debug, Error)]
pub enum RagError {
    #[error("conversation has no messages")]
    EmptyConversation,

    #[error("completion failed: {0}")]
    Completion(#[from] ProviderError),
}

pub struct RagPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    chat: Arc<dyn ChatCompletionProvider>,
    options: RetrievalOptions,
}

impl std::fmt::Debug for RagPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline").field("options", &self.options).finish_non_exhaustive()
    }
}

impl RagPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        chat: Arc<dyn ChatCompletionProvider>,
    ) -> Self {
        Self { embedder, index, chat, options: RetrievalOptions::default() }
    }

    pub fn with_options(mut self, options: RetrievalOptions) -> Self {
        self.options = options;
        self
    }

    /// Fetch context for `query`. Never fails: provider errors and empty
    /// embeddings are logged and yield `""`.
    pub async fn retrieve_context(&self, query: &str) -> String {
        let vectors = match self.embedder.embed(query).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "embedding failed; continuing without context");
                return String::new();
            }
        };

        let Some(vector) = vectors.into_iter().next() else {
            warn!("no embedding returned; continuing without context");
            return String::new();
        };

        match self.index.search(&vector, &self.options).await {
            Ok(chunks) => {
                debug!(chunks = chunks.len(), "context retrieved");
                join_context(&chunks)
            }
            Err(e) => {
                warn!(error = %e, "vector search failed; continuing without context");
                String::new()
            }
        }
    }

    /// Run retrieval and open the completion stream for `messages`.
    pub async fn respond(&self, messages: &[Message]) -> Result<DeltaStream, RagError> {
        let last = messages.last().ok_or(RagError::EmptyConversation)?;

        let context = self.retrieve_context(&last.content).await;
        let augmented = augment(messages, &context);

        info!(
            messages = messages.len(),
            context_len = context.len(),
            "opening completion stream"
        );
        Ok(self.chat.stream_chat(&augmented).await?)
    }
}

/// Copy `messages`, appending the context instruction and `context` to the
/// last one. The input is not modified.
pub fn augment(messages: &[Message], context: &str) -> Vec<Message> {
    let mut out = messages.to_vec();
    if let Some(last) = out.last_mut() {
        last.content.reserve(CONTEXT_INSTRUCTION.len() + context.len());
        last.content.push_str(CONTEXT_INSTRUCTION);
        last.content.push_str(context);
    }
    out
}
