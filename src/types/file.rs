use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FileType {
    Image(ImageType),
    Other(String),
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImageType {
    Jpeg,
    Png,
    Gif,
    Webp,
    Bmp,
    Avif,
    Other(String),
}

impl ImageType {
    pub fn mime_type(&self) -> &str {
        match self {
            ImageType::Jpeg => "image/jpeg",
            ImageType::Png => "image/png",
            ImageType::Gif => "image/gif",
            ImageType::Webp => "image/webp",
            ImageType::Bmp => "image/bmp",
            ImageType::Avif => "image/avif",
            ImageType::Other(mime) => mime,
        }
    }
}

impl FileType {
    pub fn is_image(&self) -> bool {
        matches!(self, FileType::Image(_))
    }

    pub fn mime_type(&self) -> &str {
        match self {
            FileType::Image(image) => image.mime_type(),
            FileType::Other(mime) => mime,
            FileType::Unknown => "application/octet-stream",
        }
    }
}

pub struct FileTypeDetector;

impl FileTypeDetector {
    /// Sniffs the content type from the leading bytes.
    pub fn detect(data: &[u8]) -> FileType {
        match infer::get(data) {
            Some(kind) => Self::classify(kind.mime_type()),
            None => FileType::Unknown,
        }
    }

    /// Classifies a client-declared MIME type. Parameters such as
    /// `; charset=..` are ignored and matching is case-insensitive.
    pub fn from_declared(mime: &str) -> FileType {
        let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        if essence.is_empty() {
            return FileType::Unknown;
        }
        Self::classify(&essence)
    }

    fn classify(mime: &str) -> FileType {
        match mime {
            "image/jpeg" => FileType::Image(ImageType::Jpeg),
            "image/png" => FileType::Image(ImageType::Png),
            "image/gif" => FileType::Image(ImageType::Gif),
            "image/webp" => FileType::Image(ImageType::Webp),
            "image/bmp" => FileType::Image(ImageType::Bmp),
            "image/avif" => FileType::Image(ImageType::Avif),
            mime if mime.starts_with("image/") =>
                FileType::Image(ImageType::Other(mime.to_string())),
            mime => FileType::Other(mime.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[test]
    fn declared_types_are_case_insensitive_and_ignore_params() {
        assert_eq!(FileTypeDetector::from_declared("IMAGE/JPEG"), FileType::Image(ImageType::Jpeg));
        assert_eq!(
            FileTypeDetector::from_declared("image/svg+xml; charset=utf-8"),
            FileType::Image(ImageType::Other("image/svg+xml".to_string()))
        );
        assert_eq!(FileTypeDetector::from_declared("text/plain"), FileType::Other("text/plain".to_string()));
        assert_eq!(FileTypeDetector::from_declared(""), FileType::Unknown);
    }

    #[test]
    fn sniffs_png() {
        assert_eq!(FileTypeDetector::detect(PNG_HEADER), FileType::Image(ImageType::Png));
        assert_eq!(FileTypeDetector::detect(b"just text"), FileType::Unknown);
    }
}
