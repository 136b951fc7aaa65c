pub mod client;
pub mod error;
pub mod types;

pub use client::PlacesClient;
pub use error::PlacesError;
pub use types::{PlaceCandidate, TextSearchResponse};
