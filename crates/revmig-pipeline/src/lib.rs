pub mod codec;
pub mod error;
pub mod migrate;
pub mod photos;
pub mod ports;

pub use codec::JpegReencoder;
pub use error::{MigrateError, PhotoError};
pub use migrate::{Migration, MigrationOptions, MigrationReport};
pub use photos::{PhotoMaterializer, PHOTO_PREFIX};
pub use ports::{DocumentStore, ImageCodec, ObjectStorage, PlaceResolver, RowSource};
