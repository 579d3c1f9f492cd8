//! Process configuration shared by the server and the command-line tool.
//!
//! Values are plain serde structs so the server can extract them from its
//! figment and the CLI can build them from arguments. The token secret has
//! no default: a process without one refuses to start.

use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::storage::retry::RetryConfig;
use crate::token::TokenSecret;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
pub const DEFAULT_MAX_FILES: usize = 5;
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Limits applied to every upload batch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IngestPolicy {
    pub max_file_size: u64,
    pub max_files: usize,
    /// Also require the sniffed content to be an image.
    pub verify_content: bool,
}

impl Default for IngestPolicy {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_files: DEFAULT_MAX_FILES,
            verify_content: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage_root: PathBuf,
    pub public_base_url: String,
    #[serde(flatten)]
    pub ingest: IngestPolicy,
    pub write_retries: u32,
    pub retry_delay_ms: u64,
    pub token_secret: Option<SecretString>,
    pub token_ttl_secs: u64,
    pub require_auth: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("./uploads"),
            public_base_url: "/uploads".to_string(),
            ingest: IngestPolicy::default(),
            write_retries: 3,
            retry_delay_ms: 50,
            token_secret: None,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            require_auth: false,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ingest.max_files == 0 {
            return Err(ConfigError::Invalid { key: "max_files", reason: "must be at least 1".into() });
        }
        if self.ingest.max_file_size == 0 {
            return Err(ConfigError::Invalid { key: "max_file_size", reason: "must be at least 1".into() });
        }
        if self.write_retries == 0 {
            return Err(ConfigError::Invalid { key: "write_retries", reason: "must be at least 1".into() });
        }
        Ok(())
    }

    pub fn token_secret(&self) -> Result<TokenSecret, ConfigError> {
        let raw = self.token_secret.as_ref().ok_or(ConfigError::Missing("token_secret"))?;
        TokenSecret::new(raw.expose_secret().as_str()).map_err(|e| ConfigError::Invalid { key: "token_secret", reason: e.to_string() })
    }

    pub fn retry(&self) -> RetryConfig {
        RetryConfig::new(self.write_retries, std::time::Duration::from_millis(self.retry_delay_ms))
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        i64::try_from(self.token_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }
}
