//! The migration run: rows in source order, one at a time.
//!
//! A resolved row produces one merge write of its place and one new review.
//! Unresolved rows are skipped. Any infrastructure error from the row source,
//! the place search, or the document store stops the run; writes already made
//! stay in place.

use revmig_core::review::columns;
use revmig_core::{assemble_row, PendingReview, ReviewDefaults, SourceRecord, WriteMode};
use revmig_firebase::auto_id;

use crate::error::MigrateError;
use crate::photos::PhotoMaterializer;
use crate::ports::{DocumentStore, PlaceResolver, RowSource};

/// Knobs for a single run.
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    pub write_mode: WriteMode,
    /// Only the first `limit` source rows are processed.
    pub limit: Option<usize>,
    /// Resolve places and log, but touch neither storage nor documents.
    pub dry_run: bool,
    pub review_defaults: ReviewDefaults,
}

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub rows_seen: usize,
    pub rows_skipped: usize,
    pub places_written: usize,
    pub reviews_written: usize,
    pub photos_failed: usize,
}

pub struct Migration<'a> {
    source: &'a dyn RowSource,
    resolver: &'a dyn PlaceResolver,
    store: &'a dyn DocumentStore,
    photos: PhotoMaterializer<'a>,
    options: MigrationOptions,
}

impl<'a> Migration<'a> {
    #[must_use]
    pub fn new(
        source: &'a dyn RowSource,
        resolver: &'a dyn PlaceResolver,
        store: &'a dyn DocumentStore,
        photos: PhotoMaterializer<'a>,
        options: MigrationOptions,
    ) -> Self {
        Self {
            source,
            resolver,
            store,
            photos,
            options,
        }
    }

    /// Migrates every source row.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError`] on the first infrastructure failure. In batched
    /// mode a failure before the final commit means no review was written.
    pub async fn run(&self) -> Result<MigrationReport, MigrateError> {
        let mut rows = self.source.fetch_rows().await?;
        if let Some(limit) = self.options.limit {
            rows.truncate(limit);
        }
        tracing::info!(
            rows = rows.len(),
            write_mode = %self.options.write_mode,
            dry_run = self.options.dry_run,
            "starting migration"
        );

        let mut report = MigrationReport::default();
        let mut pending = Vec::new();
        for record in &rows {
            report.rows_seen += 1;
            self.migrate_row(record, &mut report, &mut pending).await?;
        }

        if !pending.is_empty() {
            self.store.commit_reviews(&pending).await?;
            report.reviews_written += pending.len();
        }

        tracing::info!(
            rows_seen = report.rows_seen,
            rows_skipped = report.rows_skipped,
            places_written = report.places_written,
            reviews_written = report.reviews_written,
            photos_failed = report.photos_failed,
            "migration finished"
        );
        Ok(report)
    }

    async fn migrate_row(
        &self,
        record: &SourceRecord,
        report: &mut MigrationReport,
        pending: &mut Vec<PendingReview>,
    ) -> Result<(), MigrateError> {
        let name = record.text(columns::PLACE_NAME).unwrap_or_default();
        let address = record.text(columns::PLACE_ADDRESS).unwrap_or_default();
        if name.trim().is_empty() && address.trim().is_empty() {
            tracing::info!(record = %record.id, "row has no name or address; skipping");
            report.rows_skipped += 1;
            return Ok(());
        }

        let Some(place) = self.resolver.resolve(name, address).await? else {
            tracing::info!(record = %record.id, name, address, "no place match; skipping row");
            report.rows_skipped += 1;
            return Ok(());
        };

        let attachments = record.attachments(columns::PHOTOS);
        let defaults = &self.options.review_defaults;

        if self.options.dry_run {
            tracing::info!(
                record = %record.id,
                place_id = %place.id,
                name,
                photos = attachments.len(),
                "dry run: would write place and review"
            );
            return Ok(());
        }

        let photos = self.photos.materialize_all(&attachments).await;
        report.photos_failed += photos.iter().filter(|p| p.is_none()).count();

        let row = assemble_row(record, &place, photos, defaults);
        self.store.upsert_place(&row.place_id, &row.place).await?;
        report.places_written += 1;

        let review_id = auto_id();
        match self.options.write_mode {
            WriteMode::Immediate => {
                self.store
                    .create_review(&row.place_id, &review_id, &row.review)
                    .await?;
                report.reviews_written += 1;
            }
            WriteMode::Batched => pending.push(PendingReview {
                place_id: row.place_id.clone(),
                review_id: review_id.clone(),
                review: row.review,
            }),
        }

        tracing::info!(
            record = %record.id,
            place_id = %row.place_id,
            review_id = %review_id,
            "migrated row"
        );
        Ok(())
    }
}
