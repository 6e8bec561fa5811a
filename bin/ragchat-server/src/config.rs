//! Server configuration, loaded from environment variables at startup.

use std::time::Duration;

use ragchat_core::providers::{gemini, openai};

/// Runtime configuration for ragchat-server.
///
/// Every field has a default so the server starts without any environment
/// variables; vendor calls fail at request time until keys are provided.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated CORS origins; `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    /// Connect timeout for every outbound vendor call.
    pub connect_timeout: Duration,

    /// Nearest neighbours fetched per question (default: 5).
    pub retrieval_top_k: usize,

    /// HNSW search breadth (default: 128).
    pub retrieval_hnsw_ef: usize,

    // ── OpenAI-compatible chat + realtime ───────────────────────────────────
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub chat_model: String,
    pub realtime_model: String,

    // ── Gemini embeddings ──────────────────────────────────────────────────
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub embedding_model: String,

    // ── Qdrant ─────────────────────────────────────────────────────────────
    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,
    pub qdrant_collection: String,

    // ── Supabase ───────────────────────────────────────────────────────────
    pub supabase_url: String,
    pub supabase_service_key: String,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let env_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_owned());
        let optional = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        Self {
            bind_address: env_or("RAGCHAT_BIND", "0.0.0.0:3000"),
            log_level: env_or("RAGCHAT_LOG", "info"),
            log_json: get("RAGCHAT_LOG_JSON").map(|v| parse_bool(&v)).unwrap_or(false),
            cors_allowed_origins: optional("RAGCHAT_CORS_ORIGINS"),
            enable_swagger: get("RAGCHAT_ENABLE_SWAGGER").map(|v| parse_bool(&v)).unwrap_or(true),
            connect_timeout: Duration::from_secs(parse_or(
                get("RAGCHAT_CONNECT_TIMEOUT_SECS"),
                10,
            )),
            retrieval_top_k: parse_or(get("RAGCHAT_TOP_K"), 5),
            retrieval_hnsw_ef: parse_or(get("RAGCHAT_HNSW_EF"), 128),

            openai_api_key: env_or("OPENAI_API_KEY", ""),
            openai_base_url: env_or("OPENAI_BASE_URL", openai::DEFAULT_BASE_URL),
            chat_model: env_or("RAGCHAT_CHAT_MODEL", "gpt-4o-mini"),
            realtime_model: env_or("RAGCHAT_REALTIME_MODEL", "gpt-4o-realtime-preview"),

            gemini_api_key: env_or("GEMINI_API_KEY", ""),
            gemini_base_url: env_or("GEMINI_BASE_URL", gemini::DEFAULT_BASE_URL),
            embedding_model: env_or("RAGCHAT_EMBEDDING_MODEL", "text-embedding-004"),

            qdrant_url: env_or("QDRANT_URL", "http://localhost:6333"),
            qdrant_api_key: optional("QDRANT_API_KEY"),
            qdrant_collection: env_or("QDRANT_COLLECTION", "documents"),

            supabase_url: env_or("SUPABASE_URL", ""),
            supabase_service_key: env_or("SUPABASE_SERVICE_ROLE_KEY", ""),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_bool(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}
