use revmig_core::SourceRecord;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One page of `GET /v0/{base}/{table}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListRecordsResponse {
    #[serde(default)]
    pub records: Vec<AirtableRecord>,
    /// Cursor for the next page; absent on the last page.
    #[serde(default)]
    pub offset: Option<String>,
}

/// A record as listed; record metadata other than `id` is not kept.
#[derive(Debug, Clone, Deserialize)]
pub struct AirtableRecord {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl From<AirtableRecord> for SourceRecord {
    fn from(record: AirtableRecord) -> Self {
        SourceRecord::new(record.id, record.fields)
    }
}
