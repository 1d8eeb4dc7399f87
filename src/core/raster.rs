use crate::utils::error::{LabelError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// 解碼呼叫端送來的 base64 圖片，可接受 `data:image/...;base64,` 前綴
pub fn decode_base64_image(encoded: &str) -> Result<DynamicImage> {
    let payload = match encoded.trim().split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded.trim(),
    };

    let bytes = STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| LabelError::InvalidInput {
            message: format!("image is not valid base64: {}", e),
        })?;

    image::load_from_memory(&bytes).map_err(|e| LabelError::InvalidInput {
        message: format!("image could not be decoded: {}", e),
    })
}

/// Re-encodes to baseline JPEG in memory. Alpha is dropped since JPEG has
/// no alpha channel.
pub fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>> {
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut buffer = Cursor::new(Vec::new());
    rgb.write_to(&mut buffer, ImageFormat::Jpeg)?;
    Ok(buffer.into_inner())
}
