use ragchat_core::providers::ClientSecret;
use ragchat_core::SessionGrant;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Optional interview target for `POST /api/openai-session`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SessionQuery {
    /// Company id from `GET /api/interview-options`.
    pub company: Option<String>,
    /// Role id from `GET /api/interview-options`.
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientSecretDoc {
    pub value: String,
    pub expires_at: i64,
}

/// Response body for a granted session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub client_secret: ClientSecretDoc,
}

impl From<ClientSecret> for ClientSecretDoc {
    fn from(c: ClientSecret) -> Self {
        Self { value: c.value, expires_at: c.expires_at }
    }
}

impl From<SessionGrant> for SessionResponse {
    fn from(g: SessionGrant) -> Self {
        Self { client_secret: g.client_secret.into() }
    }
}
