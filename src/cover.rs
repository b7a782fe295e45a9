//! Cover art re-encoding.
//!
//! Feed cover images arrive in whatever format and size the publisher chose.
//! Before embedding them into every episode of a feed they are normalized
//! once: decoded, scaled to fit 800px on the longer side, and re-encoded as
//! JPEG. Failures here never fail a parse; the caller archives without a
//! cover instead.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

/// Longest edge of a re-encoded cover, in pixels.
pub const MAX_COVER_EDGE: u32 = 800;

/// JPEG quality used for re-encoded covers.
const JPEG_QUALITY: u8 = 90;

/// Decode arbitrary image bytes and re-encode as a JPEG whose longer side is
/// at most `max_edge` pixels, preserving aspect ratio.
pub fn resize_to_jpeg(data: &[u8], max_edge: u32) -> Result<Vec<u8>, image::ImageError> {
    let decoded = image::load_from_memory(data)?;
    let resized = decoded.resize(max_edge, max_edge, FilterType::Lanczos3);

    // JPEG has no alpha channel; flatten before encoding
    let rgb = resized.into_rgb8();
    let mut out = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))?;
    Ok(out)
}

/// PNG magic-byte check. Anything else is assumed to be JPEG, which is what
/// [`resize_to_jpeg`] produces.
pub fn is_png(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x89 && data[1] == 0x50
}
