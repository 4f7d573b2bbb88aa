use std::path::Path;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Uploaded media (audio or image) that is securely zeroed on drop.
/// Patient recordings and photographed documents are only ever written to
/// request-scoped staging files and are cleared from memory afterwards.
#[derive(Debug, Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct MediaBlob {
    /// Raw file bytes as uploaded.
    bytes: Vec<u8>,
    /// Original file name, if the caller supplied one.
    file_name: Option<String>,
    /// MIME type, if the caller supplied one.
    content_type: Option<String>,
}

impl MediaBlob {
    /// Create a blob from raw bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: None,
            content_type: None,
        }
    }

    /// Attach the original file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Attach the MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Get the bytes as a slice.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Check if the blob is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Get the number of bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// File suffix to stage this blob under, taken from the original file name
    /// when it has an extension, otherwise `default`.
    pub fn staging_suffix(&self, default: &str) -> String {
        self.file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_else(|| default.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_blob_creation() {
        let blob = MediaBlob::new(vec![1, 2, 3]);
        assert_eq!(blob.len(), 3);
        assert!(!blob.is_empty());
        assert!(blob.file_name().is_none());
        assert!(blob.content_type().is_none());
    }

    #[test]
    fn test_media_blob_metadata() {
        let blob = MediaBlob::new(vec![0])
            .with_file_name("prescription.JPG")
            .with_content_type("image/jpeg");
        assert_eq!(blob.file_name(), Some("prescription.JPG"));
        assert_eq!(blob.content_type(), Some("image/jpeg"));
    }

    #[test]
    fn test_staging_suffix() {
        let named = MediaBlob::new(vec![0]).with_file_name("scan.JPG");
        assert_eq!(named.staging_suffix(".png"), ".jpg");

        let unnamed = MediaBlob::new(vec![0]);
        assert_eq!(unnamed.staging_suffix(".png"), ".png");

        let no_ext = MediaBlob::new(vec![0]).with_file_name("recording");
        assert_eq!(no_ext.staging_suffix(".wav"), ".wav");

        let odd_ext = MediaBlob::new(vec![0]).with_file_name("x.w/v");
        assert_eq!(odd_ext.staging_suffix(".wav"), ".wav");
    }

    #[test]
    fn test_zeroize_clears_bytes() {
        let mut blob = MediaBlob::new(vec![9, 9, 9]).with_file_name("a.wav");
        blob.zeroize();
        assert!(blob.is_empty());
        assert!(blob.file_name().is_none());
    }
}
