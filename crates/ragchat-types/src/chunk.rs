use serde::{Deserialize, Serialize};

/// Text projected from a vector-store match.
///
/// Lives only for the duration of one request: it is folded into the
/// augmented prompt and then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
}

impl RetrievedChunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Join chunk texts with `\n`, preserving the order the index returned.
pub fn join_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
