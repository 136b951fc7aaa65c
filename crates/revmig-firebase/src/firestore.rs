//! Firestore REST client.
//!
//! Three writes are needed: a merge-upsert of a place document, creation of a
//! child review with a caller-chosen id, and an atomic commit of many review
//! creations. Authentication is a bearer access token supplied by the caller.
//!
//! Places always live in the top-level `places` collection. Reviews hang off
//! a document of the same id in the configured review collection, which is
//! `places` unless configured otherwise.

use std::time::Duration;

use rand::Rng;
use reqwest::{Client, Method, StatusCode, Url};
use revmig_core::{retry_with_backoff, PendingReview, PlaceDocument, RetryPolicy, ReviewDocument};
use serde_json::json;

use crate::documents::{place_fields, review_fields};
use crate::error::{
    firestore_is_retriable, google_error_message, is_already_exists, FirestoreError,
};
use crate::value::{encode_fields, Fields};

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";

/// Top-level collection holding place documents.
pub const PLACES_COLLECTION: &str = "places";

/// Name of the review sub-collection under each place.
pub const REVIEWS_COLLECTION: &str = "reviews";

const AUTO_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// 20-character alphanumeric document id in the format Firestore clients generate.
#[must_use]
pub fn auto_id() -> String {
    let mut rng = rand::rng();
    (0..20)
        .map(|_| char::from(AUTO_ID_ALPHABET[rng.random_range(0..AUTO_ID_ALPHABET.len())]))
        .collect()
}

pub struct FirestoreClient {
    client: Client,
    access_token: String,
    project_id: String,
    review_collection: String,
    base_url: Url,
    retry: RetryPolicy,
}

impl FirestoreClient {
    /// Creates a client for the `(default)` database of `project_id`.
    ///
    /// Reviews are written under `{review_collection}/{place_id}/reviews`.
    ///
    /// # Errors
    ///
    /// Returns [`FirestoreError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        project_id: &str,
        review_collection: &str,
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, FirestoreError> {
        Self::with_base_url(
            project_id,
            review_collection,
            access_token,
            timeout_secs,
            user_agent,
            retry,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a client with a custom API root (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`FirestoreError::Http`] if the `reqwest::Client` cannot be built
    /// or [`FirestoreError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        project_id: &str,
        review_collection: &str,
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
        base_url: &str,
    ) -> Result<Self, FirestoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        let base_url = Url::parse(base_url)
            .map_err(|e| FirestoreError::InvalidUrl(format!("'{base_url}': {e}")))?;

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            project_id: project_id.to_owned(),
            review_collection: review_collection.to_owned(),
            base_url,
            retry,
        })
    }

    /// Merge-writes the place document keyed by `place_id`.
    ///
    /// Only the fields in the document are touched; anything else already
    /// stored on the place survives.
    ///
    /// # Errors
    ///
    /// Returns [`FirestoreError`] on transport failure or a non-2xx response.
    pub async fn upsert_place(
        &self,
        place_id: &str,
        doc: &PlaceDocument,
    ) -> Result<(), FirestoreError> {
        self.merge_document(&[PLACES_COLLECTION, place_id], &place_fields(doc))
            .await
    }

    /// Creates `reviews/{review_id}` under the place.
    ///
    /// A retry that finds the review already present counts as success.
    ///
    /// # Errors
    ///
    /// Returns [`FirestoreError::Api`] with status 409 if the id is taken on
    /// the first attempt, or any other transport/API failure.
    pub async fn create_review(
        &self,
        place_id: &str,
        review_id: &str,
        review: &ReviewDocument,
    ) -> Result<(), FirestoreError> {
        self.create_document(
            &[self.review_collection.as_str(), place_id],
            REVIEWS_COLLECTION,
            review_id,
            &review_fields(review),
        )
        .await
    }

    /// Creates every pending review in one atomic commit.
    ///
    /// # Errors
    ///
    /// Returns [`FirestoreError`] if the commit is rejected; in that case none
    /// of the reviews were written. A retried commit rejected as already
    /// existing means an earlier attempt landed, and counts as success.
    pub async fn commit_reviews(&self, reviews: &[PendingReview]) -> Result<(), FirestoreError> {
        if reviews.is_empty() {
            return Ok(());
        }
        let writes: Vec<serde_json::Value> = reviews
            .iter()
            .map(|pending| {
                json!({
                    "update": {
                        "name": self.document_name(&[
                            self.review_collection.as_str(),
                            pending.place_id.as_str(),
                            REVIEWS_COLLECTION,
                            pending.review_id.as_str(),
                        ]),
                        "fields": encode_fields(&review_fields(&pending.review)),
                    },
                    "currentDocument": { "exists": false }
                })
            })
            .collect();

        let url = self.api_url(&["documents:commit"])?;
        let body = json!({ "writes": writes });
        self.send(Method::POST, &url, &body, "firestore.commit", Write::Create)
            .await?;
        tracing::info!(writes = reviews.len(), "committed review batch");
        Ok(())
    }

    /// `PATCH` with an update mask naming every field in `fields`.
    async fn merge_document(&self, path: &[&str], fields: &Fields) -> Result<(), FirestoreError> {
        let mut segments = vec!["documents"];
        segments.extend_from_slice(path);
        let mut url = self.api_url(&segments)?;
        {
            let mut pairs = url.query_pairs_mut();
            for key in fields.keys() {
                pairs.append_pair("updateMask.fieldPaths", key);
            }
        }
        let body = json!({ "fields": encode_fields(fields) });
        self.send(Method::PATCH, &url, &body, "firestore.merge", Write::Merge)
            .await
    }

    async fn create_document(
        &self,
        parent: &[&str],
        collection_id: &str,
        document_id: &str,
        fields: &Fields,
    ) -> Result<(), FirestoreError> {
        let mut segments = vec!["documents"];
        segments.extend_from_slice(parent);
        segments.push(collection_id);
        let mut url = self.api_url(&segments)?;
        url.query_pairs_mut().append_pair("documentId", document_id);
        let body = json!({ "fields": encode_fields(fields) });
        self.send(Method::POST, &url, &body, "firestore.create", Write::Create)
            .await
    }

    /// `projects/{p}/databases/(default)/documents/...` resource name.
    fn document_name(&self, path: &[&str]) -> String {
        format!(
            "projects/{}/databases/(default)/documents/{}",
            self.project_id,
            path.join("/")
        )
    }

    /// `{base}/v1/projects/{p}/databases/(default)/{segments...}`.
    fn api_url(&self, segments: &[&str]) -> Result<Url, FirestoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FirestoreError::InvalidUrl(format!("'{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(["v1", "projects", self.project_id.as_str(), "databases", "(default)"])
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: &Url,
        body: &serde_json::Value,
        label: &str,
        write: Write,
    ) -> Result<(), FirestoreError> {
        let mut attempt = 0u32;
        retry_with_backoff(self.retry, label, firestore_is_retriable, || {
            attempt += 1;
            let current = attempt;
            let request = self
                .client
                .request(method.clone(), url.clone())
                .bearer_auth(&self.access_token)
                .json(body);
            async move {
                let response = request.send().await?;
                let status = response.status();
                if status.is_success() {
                    return Ok(());
                }
                let text = response.text().await.unwrap_or_default();
                if current > 1
                    && write == Write::Create
                    && status == StatusCode::CONFLICT
                    && is_already_exists(&text)
                {
                    tracing::warn!(
                        url = %url,
                        attempt = current,
                        "create was applied by an earlier attempt"
                    );
                    return Ok(());
                }
                Err(FirestoreError::Api {
                    status: status.as_u16(),
                    url: url.to_string(),
                    message: google_error_message(&text),
                })
            }
        })
        .await
    }
}

/// How a write behaves when resent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Write {
    /// Merge update; repeating it is harmless.
    Merge,
    /// Create with an `exists=false` precondition; a repeat can hit its own earlier success.
    Create,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FirestoreClient {
        FirestoreClient::with_base_url(
            "access-map",
            "places",
            "tok",
            5,
            "ua",
            RetryPolicy::none(),
            "https://firestore.googleapis.com",
        )
        .unwrap()
    }

    #[test]
    fn auto_id_is_twenty_alphanumerics() {
        let id = auto_id();
        assert_eq!(id.len(), 20);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(auto_id(), id);
    }

    #[test]
    fn api_url_targets_default_database() {
        let url = client().api_url(&["documents", "places", "p1"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://firestore.googleapis.com/v1/projects/access-map/databases/(default)/documents/places/p1"
        );
    }

    #[test]
    fn commit_url_keeps_colon_suffix() {
        let url = client().api_url(&["documents:commit"]).unwrap();
        assert!(url
            .as_str()
            .ends_with("/databases/(default)/documents:commit"));
    }

    #[test]
    fn document_name_is_resource_path() {
        assert_eq!(
            client().document_name(&["places", "p1", "reviews", "r1"]),
            "projects/access-map/databases/(default)/documents/places/p1/reviews/r1"
        );
    }
}
