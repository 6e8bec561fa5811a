//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors become a JSON
//! `{ "error": ... }` body with the matching status code.
//!
//! Upstream and internal failures are logged in full; callers only see a
//! short message so vendor URLs and keys never reach the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ragchat_core::{ProviderError, RagError, SessionError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or rejected bearer token.
    #[error("unauthorized")]
    Unauthorized,

    /// Authenticated, but no session credits left.
    #[error("No credits")]
    NoCredits,

    /// A vendor call failed before anything was streamed.
    #[error("upstream error: {0}")]
    Upstream(#[from] ProviderError),

    /// An unclassified internal server error, with a client-safe message.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_owned()),
            ServerError::NoCredits => (StatusCode::PAYMENT_REQUIRED, "No credits".to_owned()),
            ServerError::Upstream(e) => {
                error!(error = %e, "upstream provider error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "upstream provider error".to_owned(),
                )
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, m.clone())
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<RagError> for ServerError {
    fn from(e: RagError) -> Self {
        match e {
            RagError::EmptyConversation => ServerError::BadRequest("messages must not be empty".into()),
            RagError::Completion(e) => ServerError::Upstream(e),
        }
    }
}

impl From<SessionError> for ServerError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Unauthenticated => ServerError::Unauthorized,
            SessionError::NoCredits => ServerError::NoCredits,
            SessionError::Realtime(e) => ServerError::Upstream(e),
            SessionError::MissingSecret => {
                ServerError::Internal("Error in generating client secret".into())
            }
            SessionError::CreateUser(e) => {
                error!(error = %e, "credit record creation failed");
                ServerError::Internal("Error in inserting user".into())
            }
        }
    }
}
