use crate::{FileTypeDetector, IngestError, IngestPolicy, RawUpload};

pub struct ValidationManager {
    policy: IngestPolicy,
}

impl ValidationManager {
    pub fn new(policy: IngestPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &IngestPolicy {
        &self.policy
    }

    /// Checks the whole batch. Nothing may be written unless this passes.
    pub fn validate_batch(&self, files: &[RawUpload]) -> Result<(), IngestError> {
        if files.is_empty() {
            return Err(IngestError::NoFilesProvided);
        }
        if files.len() > self.policy.max_files {
            return Err(IngestError::TooManyFiles { count: files.len(), max: self.policy.max_files });
        }
        for file in files {
            self.validate_file(file)?;
        }
        Ok(())
    }

    pub fn validate_file(&self, file: &RawUpload) -> Result<(), IngestError> {
        if !FileTypeDetector::from_declared(&file.mime_type).is_image() {
            return Err(IngestError::UnsupportedMediaType {
                file_name: file.file_name.clone(),
                mime_type: file.mime_type.clone(),
            });
        }

        if file.size() > self.policy.max_file_size {
            return Err(IngestError::PayloadTooLarge {
                file_name: file.file_name.clone(),
                size: file.size(),
                max: self.policy.max_file_size,
            });
        }

        if self.policy.verify_content {
            let sniffed = FileTypeDetector::detect(&file.data);
            if !sniffed.is_image() {
                return Err(IngestError::UnsupportedMediaType {
                    file_name: file.file_name.clone(),
                    mime_type: sniffed.mime_type().to_string(),
                });
            }
        }

        Ok(())
    }
}
