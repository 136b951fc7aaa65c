//! Assembly of place and review documents from a source row.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::documents::{PhotoAsset, PlaceDocument, ResolvedPlace, ReviewDocument};
use crate::normalize::normalize_answer;
use crate::record::SourceRecord;

/// Column names in the review spreadsheet.
pub mod columns {
    pub const PLACE_NAME: &str = "Restaurant Name";
    pub const PLACE_ADDRESS: &str = "Restaurant Address";
    pub const REVIEWER_FIRST_NAME: &str = "Mailing List - First Name";
    pub const RATING: &str = "Overall rating (out of 5)";
    pub const STEPS_ON_ENTRY: &str = "Steps on Entry";
    pub const STABLE_RAMP: &str = "Stable ramp";
    pub const TABLE_ACCESS: &str = "Table Access";
    pub const MOVEMENT_SPACE: &str = "Sufficient Movement Space";
    pub const ACCESSIBLE_TOILET: &str = "Wheelchair Accessible Toilet";
    pub const ACCESSIBLE_PARKING: &str = "Accessible Parking";
    pub const OUTDOOR_EATING: &str = "Outdoor Eating";
    pub const COMMENT: &str = "Other comment";
    pub const PHOTOS: &str = "Any photos";
}

/// Fallbacks applied when a row lacks reviewer or rating data.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDefaults {
    pub default_rating: f64,
    pub legacy_user_uid: String,
    pub legacy_user_name: String,
    pub created_at: DateTime<Utc>,
}

impl ReviewDefaults {
    #[must_use]
    pub fn new(default_rating: f64, legacy_user_uid: &str, legacy_user_name: &str) -> Self {
        Self {
            default_rating,
            legacy_user_uid: legacy_user_uid.to_string(),
            legacy_user_name: legacy_user_name.to_string(),
            created_at: legacy_created_at(),
        }
    }
}

/// Creation timestamp stamped on every migrated review: 2021-02-01T00:00:00Z.
#[must_use]
pub fn legacy_created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 2, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// The two documents produced for one resolved row.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledRow {
    pub place_id: String,
    pub place: PlaceDocument,
    pub review: ReviewDocument,
}

/// Builds the place and review documents for a row whose place resolved.
///
/// `photos` is carried through positionally, `None` slots included.
#[must_use]
pub fn assemble_row(
    record: &SourceRecord,
    place: &ResolvedPlace,
    photos: Vec<Option<PhotoAsset>>,
    defaults: &ReviewDefaults,
) -> AssembledRow {
    let name = record.text(columns::PLACE_NAME).unwrap_or_default();
    let address = record.text(columns::PLACE_ADDRESS).unwrap_or_default();

    let review = ReviewDocument {
        user_uid: defaults.legacy_user_uid.clone(),
        user_name: record
            .text(columns::REVIEWER_FIRST_NAME)
            .map_or_else(|| defaults.legacy_user_name.clone(), str::to_string),
        rating: record
            .number(columns::RATING)
            .unwrap_or(defaults.default_rating),
        steps_on_entry: record
            .raw(columns::STEPS_ON_ENTRY)
            .and_then(parse_steps)
            .unwrap_or(0),
        has_stable_ramp: normalize_answer(record.text(columns::STABLE_RAMP)),
        wc_fits_table: normalize_answer(record.text(columns::TABLE_ACCESS)),
        has_movement_space: normalize_answer(record.text(columns::MOVEMENT_SPACE)),
        has_accessible_toilet: normalize_answer(record.text(columns::ACCESSIBLE_TOILET)),
        has_accessible_parking: normalize_answer(record.text(columns::ACCESSIBLE_PARKING)),
        has_outdoor_eating: normalize_answer(record.text(columns::OUTDOOR_EATING)),
        comment: record
            .text(columns::COMMENT)
            .unwrap_or_default()
            .to_string(),
        created_at: defaults.created_at,
        photos,
    };

    AssembledRow {
        place_id: place.id.clone(),
        place: PlaceDocument::new(place, name, address),
        review,
    }
}

/// Integer step count from a number or a string with a leading integer.
///
/// Strings follow `parseInt` rules: leading whitespace and an optional sign,
/// then as many digits as are present (`"2 steps"` is 2, `"abc"` is `None`).
fn parse_steps(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            #[allow(clippy::cast_possible_truncation)]
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
