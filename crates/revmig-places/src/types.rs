//! Wire types for the Places Text Search response.

use revmig_core::ResolvedPlace;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TextSearchResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<PlaceCandidate>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceCandidate {
    pub place_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<PlaceCandidate> for ResolvedPlace {
    fn from(candidate: PlaceCandidate) -> Self {
        ResolvedPlace {
            id: candidate.place_id,
            lat: candidate.geometry.location.lat,
            lng: candidate.geometry.location.lng,
            category_tags: candidate.types,
        }
    }
}
