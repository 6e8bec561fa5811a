//! Router harness for the `/api` route tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use ragchat_core::testing::{FakeChat, FakeEmbedder, FakeIdentity, FakeIndex, FakeLedger, FakeRealtime};
use ragchat_core::{RagPipeline, SessionIssuer};
use tower::ServiceExt;

use crate::config::Config;
use crate::routes;
use crate::state::AppState;

pub struct Fakes {
    pub embedder: Arc<FakeEmbedder>,
    pub index: Arc<FakeIndex>,
    pub chat: Arc<FakeChat>,
    pub identity: Arc<FakeIdentity>,
    pub ledger: Arc<FakeLedger>,
    pub realtime: Arc<FakeRealtime>,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            embedder: Arc::new(FakeEmbedder::returning(vec![vec![0.1, 0.2, 0.3]])),
            index: Arc::new(FakeIndex::with_texts(["Rust is maintained by the Rust project."])),
            chat: Arc::new(FakeChat::streaming(["Hello", ", ", "world"])),
            identity: Arc::new(FakeIdentity::new()),
            ledger: Arc::new(FakeLedger::new()),
            realtime: Arc::new(FakeRealtime::granting("ek_test")),
        }
    }
}

impl Fakes {
    pub fn router(&self) -> Router {
        let rag = RagPipeline::new(self.embedder.clone(), self.index.clone(), self.chat.clone());
        let sessions =
            SessionIssuer::new(self.identity.clone(), self.ledger.clone(), self.realtime.clone());
        let state = AppState {
            config: Arc::new(Config::from_lookup(|_| None)),
            rag: Arc::new(rag),
            sessions: Arc::new(sessions),
        };
        routes::build(Arc::new(state))
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub async fn send(router: Router, request: Request<Body>) -> TestResponse {
    let resp = router.oneshot(request).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
    TestResponse { status, headers, body }
}

pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
