//! Place and review documents in Firestore field form.

use revmig_core::{PhotoAsset, PlaceDocument, ReviewDocument, Tally};

use crate::value::{Fields, Value};

fn tally_value(tally: &Tally) -> Value {
    let mut fields = Fields::new();
    fields.insert("na".into(), tally.na.into());
    fields.insert("no".into(), tally.no.into());
    fields.insert("yes".into(), tally.yes.into());
    fields.insert("unsure".into(), tally.unsure.into());
    Value::Map(fields)
}

fn photo_value(photo: Option<&PhotoAsset>) -> Value {
    match photo {
        Some(asset) => {
            let mut fields = Fields::new();
            fields.insert("url".into(), asset.url.as_str().into());
            fields.insert("uuid".into(), asset.id.as_str().into());
            Value::Map(fields)
        }
        None => Value::Null,
    }
}

fn string_array(items: &[String]) -> Value {
    Value::Array(items.iter().map(|s| s.as_str().into()).collect())
}

/// Fields of a place document. Every key here is also the merge update mask.
#[must_use]
pub fn place_fields(doc: &PlaceDocument) -> Fields {
    let mut fields = Fields::new();
    fields.insert("name".into(), doc.name.as_str().into());
    fields.insert("address".into(), doc.address.as_str().into());
    fields.insert("hash".into(), doc.hash.as_str().into());
    fields.insert("lat".into(), Value::number(doc.lat));
    fields.insert("lng".into(), Value::number(doc.lng));
    fields.insert("recentReviews".into(), string_array(&doc.recent_reviews));
    fields.insert(
        "accessibleParkingTally".into(),
        tally_value(&doc.accessible_parking_tally),
    );
    fields.insert(
        "accessibleToiletTally".into(),
        tally_value(&doc.accessible_toilet_tally),
    );
    fields.insert(
        "movementSpaceTally".into(),
        tally_value(&doc.movement_space_tally),
    );
    fields.insert(
        "outdoorEatingTally".into(),
        tally_value(&doc.outdoor_eating_tally),
    );
    fields.insert("stableRampTally".into(), tally_value(&doc.stable_ramp_tally));
    fields.insert(
        "stepsPoll".into(),
        Value::Map(
            doc.steps_poll
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(*v)))
                .collect(),
        ),
    );
    fields.insert("types".into(), string_array(&doc.types));
    fields
}

#[must_use]
pub fn review_fields(doc: &ReviewDocument) -> Fields {
    let mut fields = Fields::new();
    fields.insert("userUid".into(), doc.user_uid.as_str().into());
    fields.insert("userName".into(), doc.user_name.as_str().into());
    fields.insert("rating".into(), Value::number(doc.rating));
    fields.insert("stepsOnEntry".into(), doc.steps_on_entry.into());
    fields.insert("hasStableRamp".into(), doc.has_stable_ramp.as_str().into());
    fields.insert("wcFitsTable".into(), doc.wc_fits_table.as_str().into());
    fields.insert(
        "hasMovementSpace".into(),
        doc.has_movement_space.as_str().into(),
    );
    fields.insert(
        "hasAccessibleToilet".into(),
        doc.has_accessible_toilet.as_str().into(),
    );
    fields.insert(
        "hasAccessibleParking".into(),
        doc.has_accessible_parking.as_str().into(),
    );
    fields.insert(
        "hasOutdoorEating".into(),
        doc.has_outdoor_eating.as_str().into(),
    );
    fields.insert("comment".into(), doc.comment.as_str().into());
    fields.insert("createdAt".into(), doc.created_at.into());
    fields.insert(
        "photos".into(),
        Value::Array(doc.photos.iter().map(|p| photo_value(p.as_ref())).collect()),
    );
    fields
}
