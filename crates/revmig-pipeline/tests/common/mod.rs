//! In-memory collaborators for pipeline tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use revmig_core::{
    PendingReview, PlaceDocument, ResolvedPlace, RetryPolicy, ReviewDefaults, ReviewDocument,
    SourceRecord, WriteMode,
};
use revmig_airtable::AirtableError;
use revmig_firebase::FirestoreError;
use revmig_pipeline::{
    DocumentStore, ImageCodec, MigrateError, MigrationOptions, ObjectStorage, PhotoError,
    PhotoMaterializer, PlaceResolver, RowSource,
};
use revmig_places::PlacesError;
use serde_json::Value;

pub const LEGACY_UID: &str = "6BGlA6AO35gWLwZ6TuAxiyzGQDp1";

pub fn row(id: &str, fields: Value) -> SourceRecord {
    let Value::Object(map) = fields else {
        panic!("row fields must be an object");
    };
    SourceRecord::new(id, map)
}

pub fn place(id: &str, lat: f64, lng: f64, tags: &[&str]) -> ResolvedPlace {
    ResolvedPlace {
        id: id.to_string(),
        lat,
        lng,
        category_tags: tags.iter().map(ToString::to_string).collect(),
    }
}

pub fn url_expires() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 17, 0, 0, 0).unwrap()
}

pub fn options(write_mode: WriteMode) -> MigrationOptions {
    MigrationOptions {
        write_mode,
        limit: None,
        dry_run: false,
        review_defaults: ReviewDefaults::new(3.0, LEGACY_UID, "Legacy Review"),
    }
}

pub fn materializer<'a>(
    storage: &'a FakeStorage,
    codec: &'a CountingCodec,
) -> PhotoMaterializer<'a> {
    PhotoMaterializer::new(
        storage,
        codec,
        5,
        "revmig-test/0.1",
        url_expires(),
        RetryPolicy::none(),
    )
    .unwrap()
}

pub struct FakeSource {
    pub rows: Vec<SourceRecord>,
}

#[async_trait]
impl RowSource for FakeSource {
    async fn fetch_rows(&self) -> Result<Vec<SourceRecord>, MigrateError> {
        Ok(self.rows.clone())
    }
}

/// A source whose listing is always rejected.
pub struct FailingSource;

#[async_trait]
impl RowSource for FailingSource {
    async fn fetch_rows(&self) -> Result<Vec<SourceRecord>, MigrateError> {
        Err(MigrateError::Source(AirtableError::RateLimited))
    }
}

/// Resolves by exact place name; `fail_on` names a search that errors.
#[derive(Default)]
pub struct FakeResolver {
    pub places: HashMap<String, ResolvedPlace>,
    pub calls: Mutex<Vec<(String, String)>>,
    pub fail_on: Option<String>,
}

impl FakeResolver {
    pub fn with(mut self, name: &str, place: ResolvedPlace) -> Self {
        self.places.insert(name.to_string(), place);
        self
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.fail_on = Some(name.to_string());
        self
    }
}

#[async_trait]
impl PlaceResolver for FakeResolver {
    async fn resolve(
        &self,
        name: &str,
        address: &str,
    ) -> Result<Option<ResolvedPlace>, MigrateError> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), address.to_string()));
        if self.fail_on.as_deref() == Some(name) {
            return Err(MigrateError::Places(PlacesError::QuotaExceeded(
                "daily quota exhausted".to_string(),
            )));
        }
        Ok(self.places.get(name).cloned())
    }
}

/// Object store keyed by name; signed URLs are deterministic.
#[derive(Default)]
pub struct FakeStorage {
    pub objects: Mutex<BTreeMap<String, (Vec<u8>, String)>>,
    pub uploads: AtomicUsize,
}

impl FakeStorage {
    pub fn with_object(self, name: &str, bytes: &[u8]) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert(name.to_string(), (bytes.to_vec(), "image/jpeg".to_string()));
        self
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, PhotoError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), PhotoError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .unwrap()
            .insert(name.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    async fn signed_read_url(
        &self,
        name: &str,
        expires: DateTime<Utc>,
    ) -> Result<String, PhotoError> {
        Ok(format!(
            "https://signed.test/{name}?Expires={}",
            expires.timestamp()
        ))
    }
}

/// Records every write; optionally fails review creation.
#[derive(Default)]
pub struct FakeStore {
    pub places: Mutex<Vec<(String, PlaceDocument)>>,
    pub reviews: Mutex<Vec<(String, String, ReviewDocument)>>,
    pub commits: AtomicUsize,
    pub fail_reviews: bool,
}

impl FakeStore {
    pub fn failing_reviews() -> Self {
        Self {
            fail_reviews: true,
            ..Self::default()
        }
    }

    pub fn place_count(&self) -> usize {
        self.places.lock().unwrap().len()
    }

    pub fn review_count(&self) -> usize {
        self.reviews.lock().unwrap().len()
    }

    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    fn rejection() -> MigrateError {
        MigrateError::Store(FirestoreError::Api {
            status: 503,
            url: "https://firestore.test".to_string(),
            message: "UNAVAILABLE: backend unavailable".to_string(),
        })
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn upsert_place(&self, place_id: &str, doc: &PlaceDocument) -> Result<(), MigrateError> {
        self.places
            .lock()
            .unwrap()
            .push((place_id.to_string(), doc.clone()));
        Ok(())
    }

    async fn create_review(
        &self,
        place_id: &str,
        review_id: &str,
        review: &ReviewDocument,
    ) -> Result<(), MigrateError> {
        if self.fail_reviews {
            return Err(Self::rejection());
        }
        self.reviews.lock().unwrap().push((
            place_id.to_string(),
            review_id.to_string(),
            review.clone(),
        ));
        Ok(())
    }

    async fn commit_reviews(&self, reviews: &[PendingReview]) -> Result<(), MigrateError> {
        if self.fail_reviews {
            return Err(Self::rejection());
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        let mut stored = self.reviews.lock().unwrap();
        for pending in reviews {
            stored.push((
                pending.place_id.clone(),
                pending.review_id.clone(),
                pending.review.clone(),
            ));
        }
        Ok(())
    }
}

/// Returns a fixed JPEG payload and counts invocations.
#[derive(Default)]
pub struct CountingCodec {
    pub calls: AtomicUsize,
}

pub const REENCODED: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0xFF, 0xD9];

impl CountingCodec {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageCodec for CountingCodec {
    fn to_jpeg(&self, _bytes: &[u8]) -> Result<Vec<u8>, PhotoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(REENCODED.to_vec())
    }
}
