//! Credit-gated realtime voice sessions.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::post;
use axum::{Json, Router};
use ragchat_types::{Company, InterviewProfile, InterviewRole};
use tracing::info;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::middleware::auth::BearerToken;
use crate::schemas::session::{ClientSecretDoc, SessionQuery, SessionResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(create_session),
    components(schemas(SessionResponse, ClientSecretDoc))
)]
pub struct SessionApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/openai-session", post(create_session))
}

/// Mint an ephemeral realtime client secret, spending one credit.
///
/// Without `company` and `role` the session runs as an English tutor;
/// with both it runs as an interviewer for that target.
#[utoipa::path(
    post,
    path = "/api/openai-session",
    tag = "session",
    params(SessionQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Session granted", body = SessionResponse),
        (status = 400, description = "Unknown or incomplete interview profile"),
        (status = 401, description = "Missing or rejected bearer token"),
        (status = 402, description = "No credits left"),
        (status = 500, description = "Realtime provider or credit ledger failed"),
    )
)]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
    query: Result<Query<SessionQuery>, QueryRejection>,
) -> Result<Json<SessionResponse>, ServerError> {
    let Query(query) = query.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let profile = parse_profile(&query)?;
    if let Some(p) = &profile {
        info!(company = %p.company, role = %p.role, "interview session requested");
    }

    let grant = state.sessions.issue(token.as_deref(), profile.as_ref()).await?;
    Ok(Json(grant.into()))
}

/// Both fields or neither.
fn parse_profile(query: &SessionQuery) -> Result<Option<InterviewProfile>, ServerError> {
    match (query.company.as_deref(), query.role.as_deref()) {
        (None, None) => Ok(None),
        (Some(company), Some(role)) => {
            let company = Company::from_str(company)
                .map_err(|_| ServerError::BadRequest(format!("unknown company `{company}`")))?;
            let role = InterviewRole::from_str(role)
                .map_err(|_| ServerError::BadRequest(format!("unknown role `{role}`")))?;
            Ok(Some(InterviewProfile { company, role }))
        }
        _ => Err(ServerError::BadRequest(
            "company and role must be given together".into(),
        )),
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use ragchat_core::testing::{FakeIdentity, FakeLedger};
    use ragchat_types::AuthenticatedUser;

    use super::super::test_support::{send, Fakes};
    use super::*;

    const TOKEN: &str = "valid-token";

    fn fakes(ledger: FakeLedger) -> Fakes {
        let alice = AuthenticatedUser {
            id: "alice".into(),
            email: Some("alice@example.com".into()),
            role: "authenticated".into(),
        };
        Fakes {
            identity: Arc::new(FakeIdentity::new().with_user(TOKEN, alice)),
            ledger: Arc::new(ledger),
            ..Fakes::default()
        }
    }

    fn request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut req = Request::post(uri);
        if let Some(t) = token {
            req = req.header("authorization", format!("Bearer {t}"));
        }
        req.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_token_is_401_without_realtime_call() {
        let f = fakes(FakeLedger::new().with_record("alice", 3));
        let resp = send(f.router(), request("/api/openai-session", None)).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
        assert_eq!(resp.json()["error"], "Unauthorized");
        assert_eq!(f.realtime.calls(), 0);
    }

    #[tokio::test]
    async fn zero_credits_is_402_without_ledger_write() {
        let f = fakes(FakeLedger::new().with_record("alice", 0));
        let resp = send(f.router(), request("/api/openai-session", Some(TOKEN))).await;
        assert_eq!(resp.status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(resp.json()["error"], "No credits");
        assert!(f.ledger.writes().is_empty());
        assert_eq!(f.realtime.calls(), 0);
    }

    #[tokio::test]
    async fn granted_session_returns_client_secret_and_spends_a_credit() {
        let f = fakes(FakeLedger::new().with_record("alice", 3));
        let resp = send(f.router(), request("/api/openai-session", Some(TOKEN))).await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.json()["client_secret"]["value"], "ek_test");
        assert_eq!(f.ledger.chats_left("alice"), Some(2));
    }

    #[tokio::test]
    async fn interview_profile_shapes_the_instructions() {
        let f = fakes(FakeLedger::new().with_record("alice", 1));
        let resp = send(
            f.router(),
            request("/api/openai-session?company=google&role=backend", Some(TOKEN)),
        )
        .await;
        assert_eq!(resp.status, StatusCode::OK);
        let instructions = f.realtime.instructions();
        assert_eq!(instructions.len(), 1);
        assert!(instructions[0].contains("Google"));
    }

    #[tokio::test]
    async fn unknown_or_partial_profile_is_400_before_auth() {
        let f = fakes(FakeLedger::new().with_record("alice", 3));
        for uri in [
            "/api/openai-session?company=initech&role=backend",
            "/api/openai-session?company=google",
        ] {
            let resp = send(f.router(), request(uri, Some(TOKEN))).await;
            assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{uri}");
        }
        assert_eq!(f.identity.lookups(), 0);
        assert_eq!(f.realtime.calls(), 0);
    }

    #[tokio::test]
    async fn malformed_query_is_400_with_json_error() {
        let f = fakes(FakeLedger::new().with_record("alice", 3));
        let resp = send(
            f.router(),
            request("/api/openai-session?company=google&company=meta&role=backend", Some(TOKEN)),
        )
        .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert!(resp.json()["error"].is_string());
        assert_eq!(f.identity.lookups(), 0);
        assert_eq!(f.realtime.calls(), 0);
    }

    #[test]
    fn general_role_alias_parses() {
        let q = SessionQuery { company: Some("meta".into()), role: Some("general".into()) };
        let p = parse_profile(&q).unwrap().unwrap();
        assert_eq!(p.role, InterviewRole::Swe);
    }
}
