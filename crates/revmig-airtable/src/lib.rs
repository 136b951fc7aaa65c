pub mod client;
pub mod error;
pub mod types;

pub use client::AirtableClient;
pub use error::AirtableError;
pub use types::{AirtableRecord, ListRecordsResponse};
