use revmig_core::{AppConfig, ReviewDefaults, WriteMode};
use revmig_pipeline::{JpegReencoder, Migration, MigrationOptions, MigrationReport, PhotoMaterializer};

use crate::clients::{
    build_airtable_client, build_firestore_client, build_places_client, build_storage_client,
    retry_policy,
};

/// Command-line overrides for a migration run.
#[derive(Debug, Clone, Default)]
pub(crate) struct MigrateArgs {
    pub limit: Option<usize>,
    pub dry_run: bool,
    pub write_mode: Option<WriteMode>,
    pub default_rating: Option<f64>,
}

/// Applies command-line overrides on top of the environment configuration.
pub(crate) fn migration_options(config: &AppConfig, args: &MigrateArgs) -> MigrationOptions {
    MigrationOptions {
        write_mode: args.write_mode.unwrap_or(config.write_mode),
        limit: args.limit,
        dry_run: args.dry_run,
        review_defaults: ReviewDefaults::new(
            args.default_rating.unwrap_or(config.default_rating),
            &config.legacy_user_uid,
            &config.legacy_user_name,
        ),
    }
}

pub(crate) async fn run_migrate(config: &AppConfig, args: &MigrateArgs) -> anyhow::Result<()> {
    let source = build_airtable_client(config)?;
    let resolver = build_places_client(&config.places_config())?;
    let store = build_firestore_client(config)?;
    let storage = build_storage_client(config)?;
    let codec = JpegReencoder::default();

    let photos = PhotoMaterializer::new(
        &storage,
        &codec,
        config.request_timeout_secs,
        &config.user_agent,
        config.photo_url_expires,
        retry_policy(config),
    )
    .map_err(|e| anyhow::anyhow!("failed to build photo download client: {e}"))?;

    let options = migration_options(config, args);
    let dry_run = options.dry_run;
    let report = Migration::new(&source, &resolver, &store, photos, options)
        .run()
        .await?;

    print_summary(&report, dry_run);
    Ok(())
}

fn print_summary(report: &MigrationReport, dry_run: bool) {
    if dry_run {
        println!("dry run: no documents or photos were written");
    }
    println!(
        "rows seen: {}\nrows skipped: {}\nplaces written: {}\nreviews written: {}\nphotos failed: {}",
        report.rows_seen,
        report.rows_skipped,
        report.places_written,
        report.reviews_written,
        report.photos_failed
    );
}
