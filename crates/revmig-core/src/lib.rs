pub mod app_config;
pub mod config;
pub mod documents;
pub mod normalize;
pub mod record;
pub mod retry;
pub mod review;

pub use app_config::{AppConfig, PlacesConfig, WriteMode};
pub use config::{
    build_app_config, build_places_config, load_app_config, load_app_config_from_env,
    load_places_config, parse_rating,
};
pub use documents::{
    PendingReview, PhotoAsset, PlaceDocument, ResolvedPlace, ReviewDocument, Tally,
};
pub use normalize::{normalize_answer, NormalizedAnswer};
pub use record::{Attachment, SourceRecord};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use review::{assemble_row, AssembledRow, ReviewDefaults};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
