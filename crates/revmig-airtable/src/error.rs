use thiserror::Error;

#[derive(Debug, Error)]
pub enum AirtableError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by Airtable")]
    RateLimited,

    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus { status: u16, url: String, body: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("pagination limit reached for table {table}: exceeded {max_pages} pages")]
    PaginationLimit { table: String, max_pages: usize },

    #[error("invalid Airtable URL: {0}")]
    InvalidUrl(String),
}

/// Timeouts, connection failures, 429 and 5xx are worth another attempt.
pub(crate) fn is_retriable(err: &AirtableError) -> bool {
    match err {
        AirtableError::RateLimited => true,
        AirtableError::Http(e) => e.is_timeout() || e.is_connect(),
        AirtableError::UnexpectedStatus { status, .. } => *status >= 500,
        AirtableError::Deserialize { .. }
        | AirtableError::PaginationLimit { .. }
        | AirtableError::InvalidUrl(_) => false,
    }
}
