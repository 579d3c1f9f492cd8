use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// A single file part as received from a client, before validation.
#[derive(Debug, Clone)]
pub struct RawUpload {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl RawUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAsset {
    pub stored_name: String,
    pub original_extension: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub location_uri: String,
    pub checksum: String,
    pub created_at: DateTime<Utc>,
}
