pub mod documents;
pub mod error;
pub mod firestore;
pub mod signing;
pub mod storage;
pub mod value;

pub use error::{FirestoreError, StorageError};
pub use firestore::{auto_id, FirestoreClient};
pub use storage::{StorageClient, StorageEndpoints};
pub use value::{Fields, Value};
