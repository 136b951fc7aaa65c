//! Seams between the migration runner and the outside world.
//!
//! The runner only sees these traits; the concrete API clients implement them
//! below, and tests substitute in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use revmig_airtable::AirtableClient;
use revmig_core::{PendingReview, PlaceDocument, ResolvedPlace, ReviewDocument, SourceRecord};
use revmig_firebase::{FirestoreClient, StorageClient};
use revmig_places::PlacesClient;

use crate::error::{MigrateError, PhotoError};

/// Supplies every source row, in source order.
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch_rows(&self) -> Result<Vec<SourceRecord>, MigrateError>;
}

/// Maps a free-text name and address to a canonical place.
#[async_trait]
pub trait PlaceResolver: Send + Sync {
    /// `Ok(None)` when nothing matched; `Err` only for infrastructure failures.
    async fn resolve(
        &self,
        name: &str,
        address: &str,
    ) -> Result<Option<ResolvedPlace>, MigrateError>;
}

/// Object storage holding the re-hosted photos.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, PhotoError>;

    async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), PhotoError>;

    async fn signed_read_url(
        &self,
        name: &str,
        expires: DateTime<Utc>,
    ) -> Result<String, PhotoError>;
}

/// Document database receiving places and their reviews.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Merge write; safe to repeat for the same place.
    async fn upsert_place(&self, place_id: &str, doc: &PlaceDocument) -> Result<(), MigrateError>;

    async fn create_review(
        &self,
        place_id: &str,
        review_id: &str,
        review: &ReviewDocument,
    ) -> Result<(), MigrateError>;

    /// All-or-nothing creation of buffered reviews.
    async fn commit_reviews(&self, reviews: &[PendingReview]) -> Result<(), MigrateError>;
}

/// Converts arbitrary image bytes to JPEG.
pub trait ImageCodec: Send + Sync {
    fn to_jpeg(&self, bytes: &[u8]) -> Result<Vec<u8>, PhotoError>;
}

#[async_trait]
impl RowSource for AirtableClient {
    async fn fetch_rows(&self) -> Result<Vec<SourceRecord>, MigrateError> {
        Ok(self.fetch_all_records().await?)
    }
}

#[async_trait]
impl PlaceResolver for PlacesClient {
    async fn resolve(
        &self,
        name: &str,
        address: &str,
    ) -> Result<Option<ResolvedPlace>, MigrateError> {
        Ok(PlacesClient::resolve(self, name, address).await?)
    }
}

#[async_trait]
impl ObjectStorage for StorageClient {
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, PhotoError> {
        Ok(StorageClient::list_prefix(self, prefix).await?)
    }

    async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), PhotoError> {
        Ok(StorageClient::upload(self, name, bytes, content_type).await?)
    }

    async fn signed_read_url(
        &self,
        name: &str,
        expires: DateTime<Utc>,
    ) -> Result<String, PhotoError> {
        Ok(StorageClient::signed_read_url(self, name, expires).await?)
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn upsert_place(&self, place_id: &str, doc: &PlaceDocument) -> Result<(), MigrateError> {
        Ok(FirestoreClient::upsert_place(self, place_id, doc).await?)
    }

    async fn create_review(
        &self,
        place_id: &str,
        review_id: &str,
        review: &ReviewDocument,
    ) -> Result<(), MigrateError> {
        Ok(FirestoreClient::create_review(self, place_id, review_id, review).await?)
    }

    async fn commit_reviews(&self, reviews: &[PendingReview]) -> Result<(), MigrateError> {
        Ok(FirestoreClient::commit_reviews(self, reviews).await?)
    }
}
