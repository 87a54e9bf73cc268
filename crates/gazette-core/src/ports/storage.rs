//! Image storage port.

use async_trait::async_trait;

/// Accepted upload formats. Anything else is rejected before storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Resolve a format from a MIME type string.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            _ => None,
        }
    }

    /// Resolve a format from a client-supplied filename. Both the MIME type
    /// and the extension must agree for an upload to be accepted.
    pub fn from_filename(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.').map(|(_, ext)| ext)?;
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }

    /// Canonical extension used for stored files.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

/// Stores uploaded images under a public-servable path and returns the path
/// string recorded on the post.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store(&self, format: ImageFormat, bytes: Vec<u8>) -> Result<String, StorageError>;
}

/// Storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpeg_and_png_are_accepted() {
        assert_eq!(ImageFormat::from_mime("image/png"), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::from_filename("photo.JPEG"),
            Some(ImageFormat::Jpeg)
        );
    }

    #[test]
    fn other_formats_are_rejected() {
        assert_eq!(ImageFormat::from_mime("image/gif"), None);
        assert_eq!(ImageFormat::from_filename("document.pdf"), None);
        assert_eq!(ImageFormat::from_filename("noextension"), None);
    }
}
