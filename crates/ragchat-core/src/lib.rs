//! ragchat-core – provider clients and request pipelines.
//!
//! - [`providers`]: traits at each vendor seam plus their HTTP clients
//!   (Gemini embeddings, Qdrant search, OpenAI-compatible chat streaming,
//!   OpenAI realtime sessions, Supabase auth and credit ledger).
//! - [`rag`]: embed → search → augment → stream relay.
//! - [`session`]: bearer-token auth, credit check, and ephemeral session
//!   issuance.

pub mod error;
pub mod providers;
pub mod rag;
pub mod session;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use error::ProviderError;
pub use rag::{DeltaStream, RagError, RagPipeline, RetrievalOptions};
pub use session::{SessionError, SessionGrant, SessionIssuer};
