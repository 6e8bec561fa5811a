//! Retrieval-augmented chat relay.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures::TryStreamExt;
use tracing::{info, warn};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::chat::{ChatResponseRequest, MessageDoc};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(chat_response),
    components(schemas(ChatResponseRequest, MessageDoc))
)]
pub struct ChatApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat-response", post(chat_response))
}

/// Answer the last message with retrieved context, streamed as plain text.
///
/// The body is the concatenation of the model's deltas, written as they
/// arrive. A failure after the first byte terminates the body early.
#[utoipa::path(
    post,
    path = "/api/chat-response",
    tag = "chat",
    request_body = ChatResponseRequest,
    responses(
        (status = 200, description = "Streamed assistant reply", content_type = "text/plain", body = String),
        (status = 400, description = "Malformed body or empty conversation"),
        (status = 500, description = "Completion provider failed"),
    )
)]
pub async fn chat_response(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatResponseRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(req) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let messages = req.messages.unwrap_or_default();
    if messages.is_empty() {
        return Err(ServerError::BadRequest("messages must not be empty".into()));
    }

    info!(turns = messages.len(), "chat response requested");
    let deltas = state.rag.respond(&messages).await?;
    let deltas = deltas.inspect_err(|e| warn!(error = %e, "completion stream failed mid-response"));

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(deltas),
    )
        .into_response())
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use ragchat_core::testing::{FakeChat, ScriptedDelta};
    use serde_json::json;
    use tower::ServiceExt;

    use super::super::test_support::{post_json, send, Fakes};

    fn conversation() -> serde_json::Value {
        json!({
            "messages": [
                { "role": "user", "content": "Who maintains Rust?" }
            ]
        })
    }

    #[tokio::test]
    async fn streams_concatenated_deltas_as_plain_text() {
        let fakes = Fakes::default();
        let resp = send(fakes.router(), post_json("/api/chat-response", &conversation())).await;

        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.text(), "Hello, world");
        assert!(
            resp.headers[axum::http::header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/plain")
        );
        assert_eq!(resp.headers[axum::http::header::CACHE_CONTROL], "no-cache");
        assert_eq!(fakes.embedder.queries(), vec!["Who maintains Rust?".to_owned()]);

        let requests = fakes.chat.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0][0].content.contains("Rust is maintained by the Rust project."));
    }

    #[tokio::test]
    async fn empty_or_missing_messages_are_rejected_before_any_provider_call() {
        let fakes = Fakes::default();
        for body in [json!({ "messages": [] }), json!({})] {
            let resp = send(fakes.router(), post_json("/api/chat-response", &body)).await;
            assert_eq!(resp.status, StatusCode::BAD_REQUEST);
            assert!(resp.json()["error"].is_string());
        }
        assert!(fakes.embedder.queries().is_empty());
        assert!(fakes.chat.requests().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let fakes = Fakes::default();
        let req = axum::http::Request::post("/api/chat-response")
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();
        let resp = send(fakes.router(), req).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn completion_open_failure_is_internal_error() {
        let fakes = Fakes { chat: Arc::new(FakeChat::failing()), ..Fakes::default() };
        let resp = send(fakes.router(), post_json("/api/chat-response", &conversation())).await;
        assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.json()["error"], "upstream provider error");
    }

    #[tokio::test]
    async fn deltas_before_a_mid_stream_error_are_delivered() {
        let fakes = Fakes {
            chat: Arc::new(FakeChat::scripted(vec![
                ScriptedDelta::Text("partial".into()),
                ScriptedDelta::Error("connection reset".into()),
            ])),
            ..Fakes::default()
        };
        let resp = fakes
            .router()
            .oneshot(post_json("/api/chat-response", &conversation()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let mut body = resp.into_body();
        let first = body.frame().await.unwrap().unwrap().into_data().unwrap();
        assert_eq!(&first[..], b"partial");
        assert!(body.frame().await.unwrap().is_err());
    }
}
