use ragchat_types::Message;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// OpenAPI view of [`ragchat_types::Message`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageDoc {
    /// `"user"`, `"assistant"`, or `"system"`.
    pub role: String,
    pub content: String,
}

/// Request body for `POST /api/chat-response`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponseRequest {
    /// Conversation so far; the last message is used as the retrieval query.
    #[serde(default)]
    #[schema(value_type = Option<Vec<MessageDoc>>)]
    pub messages: Option<Vec<Message>>,
}
