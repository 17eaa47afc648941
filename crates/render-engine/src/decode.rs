//! Image decoding.
//!
//! Decoding is the one asynchronous step before compositing: it resolves to a
//! [`DecodedImage`] handle, or to nothing when the payload is not a readable
//! image. Nothing downstream polls for readiness.

use std::sync::Arc;

use image::RgbaImage;
use scrollitelli_story_model::{CanvasSize, ImagePayload};

/// A decoded image at its natural resolution (straight-alpha RGBA8).
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pixels: Arc<RgbaImage>,
}

impl DecodedImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    /// Intrinsic pixel size.
    pub fn natural_size(&self) -> CanvasSize {
        let (width, height) = self.pixels.dimensions();
        CanvasSize::new(width, height)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Decode a payload on the current thread.
pub fn decode_payload(payload: &ImagePayload) -> Option<DecodedImage> {
    let Some(bytes) = payload.bytes() else {
        tracing::debug!("Image payload body is not valid base64");
        return None;
    };
    match image::load_from_memory(&bytes) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            if rgba.width() == 0 || rgba.height() == 0 {
                return None;
            }
            Some(DecodedImage::from_rgba(rgba))
        }
        Err(e) => {
            tracing::debug!(error = %e, "Image payload could not be decoded");
            None
        }
    }
}

/// Decode a payload off the async executor.
pub async fn decode(payload: ImagePayload) -> Option<DecodedImage> {
    match tokio::task::spawn_blocking(move || decode_payload(&payload)).await {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!(error = %e, "Image decode task failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png_payload(width: u32, height: u32) -> ImagePayload {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        ImagePayload::from_bytes(&buf)
    }

    #[test]
    fn test_decode_png_payload() {
        let decoded = decode_payload(&png_payload(3, 2)).unwrap();
        assert_eq!(decoded.natural_size(), CanvasSize::new(3, 2));
        assert_eq!(decoded.pixels().get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_corrupt_payload_decodes_to_nothing() {
        let payload = ImagePayload::from_bytes_with_mime(b"garbage", "image/png");
        assert!(decode_payload(&payload).is_none());
    }

    #[tokio::test]
    async fn test_async_decode_resolves_handle() {
        let decoded = decode(png_payload(4, 4)).await.unwrap();
        assert_eq!(decoded.natural_size(), CanvasSize::new(4, 4));
    }
}
