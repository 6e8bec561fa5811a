use crate::routes::{api, health};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "ragchat-server",
    description = "Retrieval-augmented chat relay and realtime voice session API",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(api::api_docs());
    root
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let docs = get_docs();
        for path in ["/health", "/api/chat-response", "/api/openai-session", "/api/interview-options"] {
            assert!(docs.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
