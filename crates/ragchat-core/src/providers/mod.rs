//! Vendor seams.
//!
//! Each external service sits behind an object-safe trait so the pipelines
//! can be driven by the real HTTP clients in production and by the fakes in
//! [`crate::testing`] under test. Implementations hold a shared
//! [`reqwest::Client`]; cloning one is cheap.

pub mod gemini;
pub mod openai;
pub mod qdrant;
pub mod realtime;
pub mod sse;
pub mod supabase;

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use ragchat_types::{AuthenticatedUser, CreditRecord, Message, RetrievedChunk};

use crate::error::ProviderError;
use crate::rag::RetrievalOptions;

pub use realtime::ClientSecret;

/// Incremental completion text, in arrival order.
pub type DeltaStream = BoxStream<'static, Result<String, ProviderError>>;

/// Turns text into embedding vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `text` as a retrieval document. May return zero vectors.
    async fn embed(&self, text: &str) -> Result<Vec<Vec<f32>>, ProviderError>;
}

/// Approximate nearest-neighbour search over stored chunks.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn search(
        &self,
        vector: &[f32],
        options: &RetrievalOptions,
    ) -> Result<Vec<RetrievedChunk>, ProviderError>;
}

/// A streaming chat-completion backend.
#[async_trait]
pub trait ChatCompletionProvider: Send + Sync {
    /// Open a completion stream. Errors before the first byte are returned
    /// here; later failures arrive as `Err` items on the stream.
    async fn stream_chat(&self, messages: &[Message]) -> Result<DeltaStream, ProviderError>;
}

/// Issues ephemeral realtime voice-session credentials.
#[async_trait]
pub trait RealtimeSessionProvider: Send + Sync {
    /// `Ok(None)` when the vendor answered without a client secret.
    async fn create_session(&self, instructions: &str) -> Result<Option<ClientSecret>, ProviderError>;
}

/// Resolves bearer tokens to users.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` when the token is rejected.
    async fn get_user(&self, token: &str) -> Result<Option<AuthenticatedUser>, ProviderError>;
}

/// Per-user session credits, stored outside this service.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    async fn find(&self, user_id: &str) -> Result<Option<CreditRecord>, ProviderError>;

    /// Overwrite the counter. Callers compute the new value from a previous
    /// read; there is no compare-and-set.
    async fn set_chats_left(&self, user_id: &str, chats_left: i64) -> Result<(), ProviderError>;

    /// Create the credit record (zero credits) and profile for a new user.
    async fn create_user(&self, user: &AuthenticatedUser) -> Result<(), ProviderError>;
}

/// Build the pooled HTTP client shared by every provider.
pub fn http_client(connect_timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    let client = reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .user_agent(concat!("ragchat/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Join `base` and `path` with exactly one `/`.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_normalizes_slashes() {
        assert_eq!(endpoint("https://a/v1/", "/chat"), "https://a/v1/chat");
        assert_eq!(endpoint("https://a/v1", "chat"), "https://a/v1/chat");
    }
}
