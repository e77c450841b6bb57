//! Image preprocessing for the local OCR tier.
//!
//! Handwritten parchis photographed in shop lighting need help before OCR:
//! grayscale conversion, then a linear contrast stretch around mid-gray.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use munim_core::config::ScanConfig;
use munim_core::error::{MunimError, Result};

/// Linear contrast factor for strength `c`, stretched around 128.
pub fn contrast_factor(c: f32) -> f32 {
    (259.0 * (c + 255.0)) / (255.0 * (259.0 - c))
}

/// Apply the contrast stretch to a single gray value, clamped to [0, 255].
///
/// Fully saturated values are fixed points: a black/white binarized image
/// passes through unchanged.
pub fn stretch(value: u8, factor: f32) -> u8 {
    (factor * (value as f32 - 128.0) + 128.0).clamp(0.0, 255.0) as u8
}

/// Decode an image, grayscale it, stretch contrast, and re-encode as JPEG.
pub fn optimize_for_ocr(image_bytes: &[u8], config: &ScanConfig) -> Result<Vec<u8>> {
    let img = image::load_from_memory(image_bytes)
        .map_err(|e| MunimError::Scan(format!("Failed to decode image: {}", e)))?;
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    let factor = contrast_factor(config.contrast);
    let gray: Vec<u8> = rgb
        .pixels()
        .map(|p| {
            // ITU-R BT.601 luma weights.
            let luma =
                0.299 * p.0[0] as f32 + 0.587 * p.0[1] as f32 + 0.114 * p.0[2] as f32;
            stretch(luma.round().clamp(0.0, 255.0) as u8, factor)
        })
        .collect();

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, config.jpeg_quality);
    encoder
        .write_image(&gray, width, height, ExtendedColorType::L8)
        .map_err(|e| MunimError::Scan(format!("Failed to encode image: {}", e)))?;

    tracing::debug!(
        width,
        height,
        in_bytes = image_bytes.len(),
        out_bytes = out.len(),
        "Image optimized for OCR"
    );
    Ok(out)
}
