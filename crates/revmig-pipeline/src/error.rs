use revmig_airtable::AirtableError;
use revmig_firebase::{FirestoreError, StorageError};
use revmig_places::PlacesError;
use thiserror::Error;

/// Failures that abort a migration run.
///
/// Writes made before the failing row are kept; nothing is rolled back.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("row source failed: {0}")]
    Source(#[from] AirtableError),

    #[error("place search failed: {0}")]
    Places(#[from] PlacesError),

    #[error("document store failed: {0}")]
    Store(#[from] FirestoreError),
}

/// Failures that empty a single photo slot without stopping the row.
#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("download of {url} returned HTTP {status}")]
    DownloadStatus { status: u16, url: String },

    #[error("image could not be re-encoded: {0}")]
    Image(#[from] image::ImageError),

    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl PhotoError {
    /// Timeouts, connection failures, 429 and 5xx on the attachment download.
    pub(crate) fn is_retriable(&self) -> bool {
        match self {
            PhotoError::Download(e) => e.is_timeout() || e.is_connect(),
            PhotoError::DownloadStatus { status, .. } => {
                *status == 429 || (500..600).contains(status)
            }
            PhotoError::Image(_) | PhotoError::Storage(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_status_classification() {
        let status = |status| PhotoError::DownloadStatus {
            status,
            url: "https://dl.airtable.com/a.png".to_string(),
        };
        assert!(status(503).is_retriable());
        assert!(status(429).is_retriable());
        assert!(!status(404).is_retriable());
        assert!(!status(403).is_retriable());
    }

    #[test]
    fn store_error_message_names_the_store() {
        let err = MigrateError::from(FirestoreError::InvalidUrl("x".to_string()));
        assert_eq!(
            err.to_string(),
            "document store failed: invalid Firestore URL: x"
        );
    }
}
