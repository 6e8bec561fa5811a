use thiserror::Error;

/// Errors returned by the vendor HTTP clients.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The vendor answered with a non-2xx status.
    #[error("{provider} API error: {status} - {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// Failed to serialize or deserialize JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The completion stream reported an error in-band.
    #[error("stream error: {0}")]
    Stream(String),

    /// A required credential or URL is not configured.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// A configured base URL could not be parsed.
    #[error("invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

impl ProviderError {
    /// Read the body of a failed response into an [`ProviderError::Api`].
    pub(crate) async fn from_response(provider: &'static str, resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        let message = resp.text().await.unwrap_or_default();
        ProviderError::Api { provider, status, message }
    }
}
