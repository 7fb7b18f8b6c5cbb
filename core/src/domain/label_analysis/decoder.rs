use base64::{Engine as _, engine::general_purpose};
use thiserror::Error;

use crate::domain::label_analysis::entities::DecodedImage;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("missing ',' between data URL header and payload")]
    MissingSeparator,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("unreadable image data: {0}")]
    Image(#[from] image::ImageError),
}

/// Decodes a `<header>,<base64 payload>` string into an RGB bitmap.
///
/// Only the payload is inspected; the header is not required to be a
/// well-formed `data:` prefix, and the image format is sniffed from the bytes.
/// Whitespace inside the payload (MIME line wrapping, trailing newline) is
/// ignored.
pub fn decode_data_url(data_url: &str) -> Result<DecodedImage, DecodeError> {
    let (_header, payload) = data_url
        .split_once(',')
        .ok_or(DecodeError::MissingSeparator)?;

    let payload: Vec<u8> = payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let bytes = general_purpose::STANDARD.decode(payload)?;
    let image = image::load_from_memory(&bytes)?;

    Ok(DecodedImage::from(image))
}

pub fn to_data_url(bytes: &[u8], mime_type: &str) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        general_purpose::STANDARD.encode(bytes)
    )
}
