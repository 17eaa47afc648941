//! Embeddable image payloads.
//!
//! Images travel through the story as `data:` URIs so that the exported
//! presentation needs no external files.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

const FALLBACK_MIME: &str = "application/octet-stream";

/// A base64 `data:` URI holding the full bytes of one image file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImagePayload(String);

impl ImagePayload {
    /// Encode raw file bytes, sniffing the MIME type from the content.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mime = image::guess_format(bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or(FALLBACK_MIME);
        Self::from_bytes_with_mime(bytes, mime)
    }

    pub fn from_bytes_with_mime(bytes: &[u8], mime: &str) -> Self {
        Self(format!(
            "data:{mime};base64,{}",
            BASE64_STANDARD.encode(bytes)
        ))
    }

    /// Wrap an existing URI. Returns `None` unless it is a base64 `data:` URI.
    pub fn from_data_uri(uri: impl Into<String>) -> Option<Self> {
        let uri = uri.into();
        if uri.starts_with("data:") && uri.contains(";base64,") {
            Some(Self(uri))
        } else {
            None
        }
    }

    /// Read an image file from disk.
    ///
    /// Unreadable files are logged and produce `None`; callers keep whatever
    /// image they had before.
    pub async fn load(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let payload = Self::from_bytes(&bytes);
                tracing::debug!(
                    path = %path.display(),
                    bytes = bytes.len(),
                    mime = payload.mime_type().unwrap_or(FALLBACK_MIME),
                    "Loaded image payload"
                );
                Some(payload)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not read image file");
                None
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The MIME type declared in the URI header.
    pub fn mime_type(&self) -> Option<&str> {
        let header = self.0.strip_prefix("data:")?;
        let (mime, _) = header.split_once(";base64,")?;
        Some(mime)
    }

    /// Decode the embedded bytes. `None` when the base64 body is corrupt.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        let (_, body) = self.0.split_once(',')?;
        BASE64_STANDARD.decode(body).ok()
    }

    /// Size of the URI as embedded in a document.
    pub fn encoded_len(&self) -> usize {
        self.0.len()
    }
}

impl std::fmt::Display for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    #[test]
    fn test_png_bytes_are_sniffed() {
        let payload = ImagePayload::from_bytes(PNG_MAGIC);
        assert_eq!(payload.mime_type(), Some("image/png"));
        assert!(payload.as_str().starts_with("data:image/png;base64,"));
        assert_eq!(payload.bytes().unwrap(), PNG_MAGIC);
    }

    #[test]
    fn test_unknown_bytes_fall_back_to_octet_stream() {
        let payload = ImagePayload::from_bytes(b"not an image");
        assert_eq!(payload.mime_type(), Some(FALLBACK_MIME));
    }

    #[test]
    fn test_only_base64_data_uris_are_accepted() {
        assert!(ImagePayload::from_data_uri("https://example.com/a.png").is_none());
        assert!(ImagePayload::from_data_uri("data:image/png,raw").is_none());
        assert!(ImagePayload::from_data_uri("data:image/png;base64,AAAA").is_some());
    }

    #[test]
    fn test_corrupt_body_decodes_to_none() {
        let payload = ImagePayload::from_data_uri("data:image/png;base64,@@@").unwrap();
        assert!(payload.bytes().is_none());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let payload = ImagePayload::from_data_uri("data:image/gif;base64,R0lG").unwrap();
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#""data:image/gif;base64,R0lG""#);
    }

    #[tokio::test]
    async fn test_missing_file_loads_as_none() {
        let path = std::env::temp_dir().join("scrollitelli_missing_image.png");
        let _ = std::fs::remove_file(&path);
        assert!(ImagePayload::load(&path).await.is_none());
    }

    #[tokio::test]
    async fn test_load_reads_file_bytes() {
        let path = std::env::temp_dir().join("scrollitelli_payload_load.png");
        std::fs::write(&path, PNG_MAGIC).unwrap();
        let payload = ImagePayload::load(&path).await.unwrap();
        assert_eq!(payload.bytes().unwrap(), PNG_MAGIC);
        std::fs::remove_file(&path).ok();
    }
}
