use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::schemas::interview::{InterviewOptionsResponse, OptionEntry};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(interview_options),
    components(schemas(InterviewOptionsResponse, OptionEntry))
)]
pub struct InterviewApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/interview-options", get(interview_options))
}

/// Companies and roles accepted by `POST /api/openai-session`.
#[utoipa::path(
    get,
    path = "/api/interview-options",
    tag = "interview",
    responses(
        (status = 200, description = "Interview catalog", body = InterviewOptionsResponse)
    )
)]
pub async fn interview_options() -> Json<InterviewOptionsResponse> {
    Json(InterviewOptionsResponse::catalog())
}

#[cfg(test)]
mod test {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    use super::super::test_support::{send, Fakes};

    #[tokio::test]
    async fn lists_every_company_and_role() {
        let req = Request::get("/api/interview-options").body(Body::empty()).unwrap();
        let resp = send(Fakes::default().router(), req).await;
        assert_eq!(resp.status, StatusCode::OK);

        let body = resp.json();
        let ids = |key: &str| -> Vec<String> {
            body[key]
                .as_array()
                .unwrap()
                .iter()
                .map(|e| e["id"].as_str().unwrap().to_owned())
                .collect()
        };
        assert_eq!(ids("companies"), ["google", "amazon", "meta", "microsoft"]);
        assert_eq!(ids("roles"), ["frontend", "backend", "fullstack", "data", "swe"]);
    }
}
