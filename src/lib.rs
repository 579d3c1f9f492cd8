pub mod config;
pub mod error;
pub mod storage;
pub mod token;


mod types;

pub use config::{AppConfig, IngestPolicy};
pub use error::{ConfigError, IngestError, StorageError, TokenError};
pub use types::*;
