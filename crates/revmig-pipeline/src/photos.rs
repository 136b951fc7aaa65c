//! Re-hosting of review photo attachments.
//!
//! Each attachment ends up as a JPEG object under `photos/` with a signed read
//! link. Failures never propagate: a photo that cannot be re-hosted becomes an
//! empty slot so the review keeps its other photos in place.

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use revmig_core::{retry_with_backoff, Attachment, PhotoAsset, RetryPolicy};
use uuid::Uuid;

use crate::error::PhotoError;
use crate::ports::{ImageCodec, ObjectStorage};

/// Object-name prefix for every re-hosted photo.
pub const PHOTO_PREFIX: &str = "photos/";

const JPEG: &str = "image/jpeg";

pub struct PhotoMaterializer<'a> {
    storage: &'a dyn ObjectStorage,
    codec: &'a dyn ImageCodec,
    http: Client,
    url_expires: DateTime<Utc>,
    retry: RetryPolicy,
}

impl<'a> PhotoMaterializer<'a> {
    /// # Errors
    ///
    /// Returns [`PhotoError::Download`] if the download client cannot be built.
    pub fn new(
        storage: &'a dyn ObjectStorage,
        codec: &'a dyn ImageCodec,
        timeout_secs: u64,
        user_agent: &str,
        url_expires: DateTime<Utc>,
        retry: RetryPolicy,
    ) -> Result<Self, PhotoError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            storage,
            codec,
            http,
            url_expires,
            retry,
        })
    }

    /// Re-hosts every attachment concurrently; results keep input order.
    pub async fn materialize_all(&self, attachments: &[Attachment]) -> Vec<Option<PhotoAsset>> {
        join_all(attachments.iter().map(|a| self.materialize(a))).await
    }

    /// Returns the stored photo for `attachment`, or `None` if any step failed.
    pub async fn materialize(&self, attachment: &Attachment) -> Option<PhotoAsset> {
        match self.try_materialize(attachment).await {
            Ok(asset) => Some(asset),
            Err(e) => {
                tracing::warn!(
                    filename = %attachment.filename,
                    url = %attachment.url,
                    error = %e,
                    "photo could not be re-hosted; leaving empty slot"
                );
                None
            }
        }
    }

    async fn try_materialize(&self, attachment: &Attachment) -> Result<PhotoAsset, PhotoError> {
        let prefix = format!("{PHOTO_PREFIX}{}", attachment.filename);
        if let Some(existing) = self.storage.list_prefix(&prefix).await?.into_iter().next() {
            let url = self
                .storage
                .signed_read_url(&existing, self.url_expires)
                .await?;
            let id = existing
                .strip_prefix(PHOTO_PREFIX)
                .unwrap_or(&existing)
                .to_string();
            tracing::debug!(object = %existing, "reusing stored photo");
            return Ok(PhotoAsset { url, id });
        }

        let (bytes, content_type) = self.download(&attachment.url).await?;
        let jpeg = if content_type.as_deref().is_some_and(is_jpeg) {
            bytes
        } else {
            tracing::debug!(
                filename = %attachment.filename,
                content_type = content_type.as_deref().unwrap_or("<none>"),
                "re-encoding photo as JPEG"
            );
            self.codec.to_jpeg(&bytes)?
        };

        let id = Uuid::new_v4().to_string();
        let object = format!("{PHOTO_PREFIX}{id}");
        self.storage.upload(&object, jpeg, JPEG).await?;
        let url = self.storage.signed_read_url(&object, self.url_expires).await?;
        tracing::debug!(object = %object, filename = %attachment.filename, "uploaded photo");
        Ok(PhotoAsset { url, id })
    }

    /// Body and `Content-Type` of a successful download.
    async fn download(&self, url: &str) -> Result<(Vec<u8>, Option<String>), PhotoError> {
        retry_with_backoff(self.retry, "photo.download", PhotoError::is_retriable, || async {
            let response = self.http.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(PhotoError::DownloadStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let bytes = response.bytes().await?;
            Ok::<_, PhotoError>((bytes.to_vec(), content_type))
        })
        .await
    }
}

/// Media type comparison ignoring parameters and case.
fn is_jpeg(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(JPEG))
}
