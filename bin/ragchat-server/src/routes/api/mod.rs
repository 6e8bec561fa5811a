//! Routes nested under `/api`.

pub mod chat;
pub mod interview;
pub mod session;

use crate::state::AppState;
use utoipa::OpenApi;

use axum::Router;
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(chat::router())
        .merge(session::router())
        .merge(interview::router())
}

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut spec = chat::ChatApi::openapi();
    spec.merge(session::SessionApi::openapi());
    spec.merge(interview::InterviewApi::openapi());
    spec
}

#[cfg(test)]
pub(crate) mod test_support;
