//! Image payload helpers: data-URL parsing and encoding.

use crate::agent::InlineImage;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;

/// MIME type assumed when the image is bare base64.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// MIME type used for uploaded blobs that carry no content type.
pub const DEFAULT_BLOB_MIME: &str = "application/octet-stream";

static DATA_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:([^;]+);base64,([A-Za-z0-9+/=]+)$").expect("data URL pattern is valid")
});

/// Split a `data:<mime>;base64,<payload>` string.
///
/// Anything that does not match is treated as raw base64 of a PNG.
pub fn decode_image(image: &str) -> InlineImage {
    if let Some(caps) = DATA_URL.captures(image) {
        return InlineImage {
            mime_type: caps[1].to_string(),
            data: caps[2].to_string(),
        };
    }

    InlineImage {
        mime_type: DEFAULT_IMAGE_MIME.to_string(),
        data: image.to_string(),
    }
}

/// Encode raw bytes as a base64 data URL.
pub fn to_data_url(mime_type: Option<&str>, bytes: &[u8]) -> String {
    let mime = mime_type
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(DEFAULT_BLOB_MIME);
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}
