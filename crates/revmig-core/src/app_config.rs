use chrono::{DateTime, Utc};

/// How review documents reach the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Each review is written as soon as its row is assembled.
    #[default]
    Immediate,
    /// Reviews are buffered and committed in a single atomic batch at the end of the run.
    Batched,
}

impl WriteMode {
    /// Parses `immediate` / `batched`. Returns `None` for anything else.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "immediate" => Some(Self::Immediate),
            "batched" => Some(Self::Batched),
            _ => None,
        }
    }
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Immediate => write!(f, "immediate"),
            WriteMode::Batched => write!(f, "batched"),
        }
    }
}

/// Settings for a standalone place lookup; a subset of [`AppConfig`].
#[derive(Clone)]
pub struct PlacesConfig {
    pub log_level: String,
    pub google_maps_api_key: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl std::fmt::Debug for PlacesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesConfig")
            .field("log_level", &self.log_level)
            .field("google_maps_api_key", &"[redacted]")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub airtable_api_token: String,
    pub airtable_base_id: String,
    pub airtable_table_name: String,
    pub google_maps_api_key: String,
    pub firebase_project_id: String,
    pub firebase_storage_bucket: String,
    pub firebase_collection_name: String,
    pub firebase_service_account_email: String,
    pub google_access_token: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub default_rating: f64,
    pub write_mode: WriteMode,
    pub photo_url_expires: DateTime<Utc>,
    pub legacy_user_uid: String,
    pub legacy_user_name: String,
}

impl AppConfig {
    /// The Places settings carried by a full configuration.
    #[must_use]
    pub fn places_config(&self) -> PlacesConfig {
        PlacesConfig {
            log_level: self.log_level.clone(),
            google_maps_api_key: self.google_maps_api_key.clone(),
            request_timeout_secs: self.request_timeout_secs,
            user_agent: self.user_agent.clone(),
            max_retries: self.max_retries,
            retry_backoff_base_ms: self.retry_backoff_base_ms,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("airtable_api_token", &"[redacted]")
            .field("airtable_base_id", &self.airtable_base_id)
            .field("airtable_table_name", &self.airtable_table_name)
            .field("google_maps_api_key", &"[redacted]")
            .field("firebase_project_id", &self.firebase_project_id)
            .field("firebase_storage_bucket", &self.firebase_storage_bucket)
            .field("firebase_collection_name", &self.firebase_collection_name)
            .field(
                "firebase_service_account_email",
                &self.firebase_service_account_email,
            )
            .field("google_access_token", &"[redacted]")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("default_rating", &self.default_rating)
            .field("write_mode", &self.write_mode)
            .field("photo_url_expires", &self.photo_url_expires)
            .field("legacy_user_uid", &self.legacy_user_uid)
            .field("legacy_user_name", &self.legacy_user_name)
            .finish()
    }
}
