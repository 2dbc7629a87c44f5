use crate::{Error, Result};
use base64::Engine as _;

/// Base64 characters decoded to sniff the image signature (12 bytes).
const SNIFF_CHARS: usize = 16;

pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to image/jpeg",
                &bytes[..bytes.len().min(4)]
            );
            "image/jpeg"
        }
    }
}

/// A base64 screenshot ready to be sent as an image block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotImage {
    pub media_type: &'static str,
    pub data: String,
}

impl ScreenshotImage {
    /// Accepts bare base64 or a `data:<mime>;base64,` URL.
    pub fn from_base64(raw: &str) -> Result<Self> {
        let data = match raw.trim().split_once(";base64,") {
            Some((prefix, payload)) if prefix.starts_with("data:") => payload,
            _ => raw.trim(),
        };
        if data.is_empty() {
            return Err(Error::BadRequest("No image data provided".to_string()));
        }

        let head_len = data.len().min(SNIFF_CHARS) / 4 * 4;
        let head = base64::engine::general_purpose::STANDARD
            .decode(&data.as_bytes()[..head_len])
            .map_err(|_| Error::BadRequest("Image data is not valid base64".to_string()))?;

        Ok(Self {
            media_type: detect_image_mime(&head),
            data: data.to_string(),
        })
    }
}
