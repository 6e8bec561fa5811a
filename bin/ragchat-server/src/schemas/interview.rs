use ragchat_types::interview::{self, CatalogEntry};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OptionEntry {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Response body for `GET /api/interview-options`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InterviewOptionsResponse {
    pub companies: Vec<OptionEntry>,
    pub roles: Vec<OptionEntry>,
}

impl From<CatalogEntry> for OptionEntry {
    fn from(e: CatalogEntry) -> Self {
        Self { id: e.id, name: e.name, description: e.description }
    }
}

impl InterviewOptionsResponse {
    pub fn catalog() -> Self {
        Self {
            companies: interview::companies().into_iter().map(Into::into).collect(),
            roles: interview::roles().into_iter().map(Into::into).collect(),
        }
    }
}
