//! Document shapes written to the place/review store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::NormalizedAnswer;

/// Best-match place returned by the place search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPlace {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub category_tags: Vec<String>,
}

/// A stored photo. `id` is the object name under `photos/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoAsset {
    pub url: String,
    #[serde(rename = "uuid")]
    pub id: String,
}

/// Per-answer counters on a place document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub na: u32,
    pub no: u32,
    pub yes: u32,
    pub unsure: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDocument {
    pub name: String,
    pub address: String,
    pub hash: String,
    pub lat: f64,
    pub lng: f64,
    pub recent_reviews: Vec<String>,
    pub accessible_parking_tally: Tally,
    pub accessible_toilet_tally: Tally,
    pub movement_space_tally: Tally,
    pub outdoor_eating_tally: Tally,
    pub stable_ramp_tally: Tally,
    pub steps_poll: BTreeMap<String, u32>,
    pub types: Vec<String>,
}

impl PlaceDocument {
    /// Fresh place document with zeroed aggregation fields.
    #[must_use]
    pub fn new(place: &ResolvedPlace, name: &str, address: &str) -> Self {
        Self {
            name: name.to_string(),
            address: address.to_string(),
            hash: String::new(),
            lat: place.lat,
            lng: place.lng,
            recent_reviews: Vec::new(),
            accessible_parking_tally: Tally::default(),
            accessible_toilet_tally: Tally::default(),
            movement_space_tally: Tally::default(),
            outdoor_eating_tally: Tally::default(),
            stable_ramp_tally: Tally::default(),
            steps_poll: BTreeMap::new(),
            types: place.category_tags.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDocument {
    pub user_uid: String,
    pub user_name: String,
    pub rating: f64,
    pub steps_on_entry: i64,
    pub has_stable_ramp: NormalizedAnswer,
    pub wc_fits_table: NormalizedAnswer,
    pub has_movement_space: NormalizedAnswer,
    pub has_accessible_toilet: NormalizedAnswer,
    pub has_accessible_parking: NormalizedAnswer,
    pub has_outdoor_eating: NormalizedAnswer,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    /// Positional; a `None` marks an attachment that failed to materialize.
    pub photos: Vec<Option<PhotoAsset>>,
}

/// A review held back for the end-of-run batch commit.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReview {
    pub place_id: String,
    pub review_id: String,
    pub review: ReviewDocument,
}
