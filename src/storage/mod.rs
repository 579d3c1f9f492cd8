pub mod disk;
pub mod ingest;
pub mod naming;
pub mod retry;
pub mod validation;

pub use disk::{DiskStorage, StorageBackend};
pub use ingest::{location_uris, Ingestor};
