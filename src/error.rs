use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Rejections raised while ingesting an upload batch. Everything except
/// `Storage` is a client error.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("No files uploaded")]
    NoFilesProvided,
    #[error("Too many files: {count} (max {max})")]
    TooManyFiles { count: usize, max: usize },
    #[error("Unsupported media type {mime_type} for {file_name}")]
    UnsupportedMediaType { file_name: String, mime_type: String },
    #[error("File {file_name} is {size} bytes (max {max})")]
    PayloadTooLarge { file_name: String, size: u64, max: u64 },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl IngestError {
    pub fn is_client_error(&self) -> bool {
        !matches!(self, IngestError::Storage(_))
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    // Tampered, malformed and expired tokens are deliberately indistinguishable.
    #[error("Invalid or expired token")]
    InvalidOrExpired,
    #[error("Token encoding error: {0}")]
    Encoding(String),
    #[error("Token secret is not configured")]
    MissingSecret,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),
    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
