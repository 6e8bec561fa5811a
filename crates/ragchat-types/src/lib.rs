//! Shared types for ragchat.
//!
//! Everything here is plain data plus pure functions: no I/O, no async.
//! Both `ragchat-core` and `ragchat-server` depend on this crate so that the
//! wire shapes stay identical on both sides of the provider seam.

pub mod chunk;
pub mod credit;
pub mod interview;
pub mod message;
pub mod transcript;

pub use chunk::{join_context, RetrievedChunk};
pub use credit::{AuthOutcome, AuthenticatedUser, CreditRecord};
pub use interview::{CatalogEntry, Company, InterviewProfile, InterviewRole};
pub use message::{Message, Role};
pub use transcript::{reduce, TranscriptEvent};
