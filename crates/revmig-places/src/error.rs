use thiserror::Error;

/// Errors returned by the Google Places client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API reported `OVER_QUERY_LIMIT`.
    #[error("Places API quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Any other non-OK API status (`REQUEST_DENIED`, `INVALID_REQUEST`, ...).
    #[error("Places API error {status}: {message}")]
    ApiError { status: String, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Transient failures: timeouts, connection errors, HTTP 429 and 5xx.
///
/// Quota exhaustion is reported in the response body, not as a 429, and is
/// never retried.
pub(crate) fn is_retriable(err: &PlacesError) -> bool {
    match err {
        PlacesError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status().is_some_and(|s| {
                    s.is_server_error() || s == reqwest::StatusCode::TOO_MANY_REQUESTS
                })
        }
        PlacesError::QuotaExceeded(_)
        | PlacesError::ApiError { .. }
        | PlacesError::Deserialize { .. } => false,
    }
}
