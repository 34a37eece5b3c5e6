use image::RgbImage;

use crate::error::PredictError;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub fn check_extension(filename: &str) -> Result<(), PredictError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(PredictError::InvalidType(filename.to_string())),
    }
}

/// Sniffs the format from the bytes, so a renamed file still fails here.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, PredictError> {
    if bytes.is_empty() {
        return Err(PredictError::MissingFile);
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(PredictError::PayloadTooLarge {
            size: bytes.len(),
            limit: MAX_UPLOAD_BYTES,
        });
    }
    let image = image::load_from_memory(bytes).map_err(|e| PredictError::Decode(e.to_string()))?;
    Ok(image.to_rgb8())
}
