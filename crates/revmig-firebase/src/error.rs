use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; `status` is the HTTP code, `message` the API's explanation.
    #[error("Firestore returned {status} for {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    #[error("invalid Firestore URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cloud Storage returned {status} for {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid storage URL: {0}")]
    InvalidUrl(String),
}

/// Timeouts, connection failures, 429 and 5xx.
pub(crate) fn is_retriable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

pub(crate) fn firestore_is_retriable(err: &FirestoreError) -> bool {
    match err {
        FirestoreError::Http(e) => e.is_timeout() || e.is_connect(),
        FirestoreError::Api { status, .. } => is_retriable_status(*status),
        FirestoreError::InvalidUrl(_) => false,
    }
}

pub(crate) fn storage_is_retriable(err: &StorageError) -> bool {
    match err {
        StorageError::Http(e) => e.is_timeout() || e.is_connect(),
        StorageError::Api { status, .. } => is_retriable_status(*status),
        StorageError::Deserialize { .. } | StorageError::InvalidUrl(_) => false,
    }
}

#[derive(Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleErrorBody,
}

#[derive(Deserialize)]
struct GoogleErrorBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Whether a Google API error body carries the `ALREADY_EXISTS` status.
pub(crate) fn is_already_exists(body: &str) -> bool {
    serde_json::from_str::<GoogleErrorEnvelope>(body)
        .is_ok_and(|envelope| envelope.error.status.as_deref() == Some("ALREADY_EXISTS"))
}

/// Human-readable message from a Google API error body, falling back to the raw text.
pub(crate) fn google_error_message(body: &str) -> String {
    match serde_json::from_str::<GoogleErrorEnvelope>(body) {
        Ok(GoogleErrorEnvelope { error }) => match (error.status, error.message) {
            (Some(status), Some(message)) => format!("{status}: {message}"),
            (None, Some(message)) => message,
            (Some(status), None) => status,
            (None, None) => body.to_string(),
        },
        Err(_) => body.to_string(),
    }
}
