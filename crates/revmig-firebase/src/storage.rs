//! Cloud Storage JSON API client for the photo bucket.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use revmig_core::{retry_with_backoff, RetryPolicy};
use serde::Deserialize;
use serde_json::json;

use crate::error::{google_error_message, storage_is_retriable, StorageError};
use crate::signing;

/// API roots, overridable for tests.
#[derive(Debug, Clone)]
pub struct StorageEndpoints {
    /// JSON API root for listing and uploads.
    pub api_base: String,
    /// IAM Credentials root for `signBlob`.
    pub iam_base: String,
    /// Host the signed links point at.
    pub download_base: String,
}

impl Default for StorageEndpoints {
    fn default() -> Self {
        Self {
            api_base: "https://storage.googleapis.com".to_string(),
            iam_base: "https://iamcredentials.googleapis.com".to_string(),
            download_base: "https://storage.googleapis.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ObjectList {
    #[serde(default)]
    items: Vec<ObjectItem>,
}

#[derive(Debug, Deserialize)]
struct ObjectItem {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignBlobResponse {
    signed_blob: String,
}

pub struct StorageClient {
    client: Client,
    access_token: String,
    bucket: String,
    service_account_email: String,
    api_base: Url,
    iam_base: Url,
    download_base: Url,
    retry: RetryPolicy,
}

impl StorageClient {
    /// Creates a client for `bucket` against the production endpoints.
    ///
    /// `service_account_email` is the identity whose key signs read URLs; the
    /// access token must be allowed to call `signBlob` for it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        bucket: &str,
        service_account_email: &str,
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, StorageError> {
        Self::with_endpoints(
            bucket,
            service_account_email,
            access_token,
            timeout_secs,
            user_agent,
            retry,
            &StorageEndpoints::default(),
        )
    }

    /// Creates a client against custom endpoints (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Http`] if the `reqwest::Client` cannot be built
    /// or [`StorageError::InvalidUrl`] if an endpoint does not parse.
    pub fn with_endpoints(
        bucket: &str,
        service_account_email: &str,
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
        endpoints: &StorageEndpoints,
    ) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        let parse = |raw: &str| {
            Url::parse(raw).map_err(|e| StorageError::InvalidUrl(format!("'{raw}': {e}")))
        };

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            bucket: bucket.to_owned(),
            service_account_email: service_account_email.to_owned(),
            api_base: parse(&endpoints.api_base)?,
            iam_base: parse(&endpoints.iam_base)?,
            download_base: parse(&endpoints.download_base)?,
            retry,
        })
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Names of objects starting with `prefix`, first page only, in the
    /// service's lexicographic order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] on transport failure, a non-2xx response, or
    /// an unexpected body.
    pub async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut url = self.url_under(
            &self.api_base,
            &["storage", "v1", "b", self.bucket.as_str(), "o"],
        )?;
        url.query_pairs_mut().append_pair("prefix", prefix);

        let body = retry_with_backoff(self.retry, "storage.list", storage_is_retriable, || {
            self.send(self.client.get(url.clone()), &url)
        })
        .await?;

        let list: ObjectList =
            serde_json::from_str(&body).map_err(|e| StorageError::Deserialize {
                context: format!("list(prefix={prefix})"),
                source: e,
            })?;
        Ok(list.items.into_iter().map(|item| item.name).collect())
    }

    /// Uploads `bytes` as object `name` with the given content type.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] on transport failure or a non-2xx response.
    pub async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut url = self.url_under(
            &self.api_base,
            &["upload", "storage", "v1", "b", self.bucket.as_str(), "o"],
        )?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", name);

        let size = bytes.len();
        retry_with_backoff(self.retry, "storage.upload", storage_is_retriable, || {
            let request = self
                .client
                .post(url.clone())
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(bytes.clone());
            self.send(request, &url)
        })
        .await?;
        tracing::debug!(object = name, size, content_type, "uploaded object");
        Ok(())
    }

    /// V2 signed `GET` URL for object `name`, valid until `expires`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the `signBlob` call fails.
    pub async fn signed_read_url(
        &self,
        name: &str,
        expires: DateTime<Utc>,
    ) -> Result<String, StorageError> {
        let expires_unix = expires.timestamp();
        let payload = signing::string_to_sign(&self.bucket, name, expires_unix);
        let signature = self.sign_blob(payload.as_bytes()).await?;
        let url = signing::signed_url(
            &self.download_base,
            &self.bucket,
            name,
            &self.service_account_email,
            expires_unix,
            &signature,
        )
        .map_err(StorageError::InvalidUrl)?;
        Ok(url.into())
    }

    /// Base64 RSA-SHA256 signature of `payload` by the service account key.
    async fn sign_blob(&self, payload: &[u8]) -> Result<String, StorageError> {
        let resource = format!("{}:signBlob", self.service_account_email);
        let url = self.url_under(
            &self.iam_base,
            &["v1", "projects", "-", "serviceAccounts", resource.as_str()],
        )?;
        let body = json!({ "payload": BASE64.encode(payload) });

        let text = retry_with_backoff(self.retry, "iam.sign_blob", storage_is_retriable, || {
            self.send(self.client.post(url.clone()).json(&body), &url)
        })
        .await?;

        let response: SignBlobResponse =
            serde_json::from_str(&text).map_err(|e| StorageError::Deserialize {
                context: "signBlob".to_string(),
                source: e,
            })?;
        Ok(response.signed_blob)
    }

    fn url_under(&self, base: &Url, segments: &[&str]) -> Result<Url, StorageError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| StorageError::InvalidUrl(format!("'{base}' cannot be a base")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends an authorized request and returns the body of a 2xx response.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<String, StorageError> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            Ok(text)
        } else {
            Err(StorageError::Api {
                status: status.as_u16(),
                url: url.to_string(),
                message: google_error_message(&text),
            })
        }
    }
}
