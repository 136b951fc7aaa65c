//! Production API clients built from the loaded configuration.

use revmig_airtable::AirtableClient;
use revmig_core::{AppConfig, PlacesConfig, RetryPolicy};
use revmig_firebase::{FirestoreClient, StorageClient};
use revmig_places::PlacesClient;

pub(crate) fn retry_policy(config: &AppConfig) -> RetryPolicy {
    RetryPolicy::new(config.max_retries, config.retry_backoff_base_ms)
}

pub(crate) fn build_airtable_client(config: &AppConfig) -> anyhow::Result<AirtableClient> {
    AirtableClient::new(
        &config.airtable_api_token,
        &config.airtable_base_id,
        &config.airtable_table_name,
        config.request_timeout_secs,
        &config.user_agent,
        retry_policy(config),
    )
    .map_err(|e| anyhow::anyhow!("failed to build Airtable client: {e}"))
}

/// Needs only the Places settings, so `resolve` works without Airtable or Firebase credentials.
pub(crate) fn build_places_client(config: &PlacesConfig) -> anyhow::Result<PlacesClient> {
    PlacesClient::new(
        &config.google_maps_api_key,
        config.request_timeout_secs,
        &config.user_agent,
        RetryPolicy::new(config.max_retries, config.retry_backoff_base_ms),
    )
    .map_err(|e| anyhow::anyhow!("failed to build Places client: {e}"))
}

pub(crate) fn build_firestore_client(config: &AppConfig) -> anyhow::Result<FirestoreClient> {
    FirestoreClient::new(
        &config.firebase_project_id,
        &config.firebase_collection_name,
        &config.google_access_token,
        config.request_timeout_secs,
        &config.user_agent,
        retry_policy(config),
    )
    .map_err(|e| anyhow::anyhow!("failed to build Firestore client: {e}"))
}

pub(crate) fn build_storage_client(config: &AppConfig) -> anyhow::Result<StorageClient> {
    StorageClient::new(
        &config.firebase_storage_bucket,
        &config.firebase_service_account_email,
        &config.google_access_token,
        config.request_timeout_secs,
        &config.user_agent,
        retry_policy(config),
    )
    .map_err(|e| anyhow::anyhow!("failed to build Cloud Storage client: {e}"))
}
