mod asset;
mod file;

pub use asset::{RawUpload, UploadedAsset};
pub use file::{FileType, FileTypeDetector, ImageType};
