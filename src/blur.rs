//! Tiny blurred placeholders for images.
//!
//! A placeholder is a 16px-wide cover-fit downscale of the source image,
//! re-encoded as a low-quality JPEG and wrapped in a data URI. Front-ends show
//! it while the real rendition loads. The reported dimensions are those of the
//! source image, not the placeholder, so layout reserves the right box.
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::ImageReader;
use std::io::Cursor;
use thiserror::Error;

const PLACEHOLDER_WIDTH: u32 = 16;
const PLACEHOLDER_QUALITY: u8 = 50;

#[derive(Debug, Error)]
pub enum BlurError {
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image encode failed: {0}")]
    Encode(std::io::Error),
}

/// A generated placeholder plus the source image dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlurData {
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

/// Decode `bytes`, downscale to a 16px-wide cover-fit thumbnail and encode it
/// as a JPEG data URI. CPU-bound; callers on the async runtime should wrap
/// this in `spawn_blocking`.
pub fn generate_blur_data(bytes: &[u8]) -> Result<BlurData, BlurError> {
    let decoded = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .decode()?;

    let width = decoded.width();
    let height = decoded.height();
    let ratio = if width > 0 {
        height as f64 / width as f64
    } else {
        1.0
    };
    let placeholder_height = ((PLACEHOLDER_WIDTH as f64 * ratio).round() as u32).max(1);

    let resized = decoded.resize_to_fill(
        PLACEHOLDER_WIDTH,
        placeholder_height,
        image::imageops::FilterType::Triangle,
    );

    let mut encoded = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut encoded, PLACEHOLDER_QUALITY);
    resized
        .to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|err| match err {
            image::ImageError::IoError(io) => BlurError::Encode(io),
            other => BlurError::Decode(other),
        })?;

    Ok(BlurData {
        data_url: format!("data:image/jpeg;base64,{}", BASE64.encode(&encoded)),
        width,
        height,
    })
}
