//! Image normalisation before OCR.
//!
//! Tesseract reads PNG directly, but camera JPEGs and huge scans OCR worse
//! and slower than a bounded grayscale PNG. Clean inputs are only converted,
//! never enhanced.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageOutputFormat};
use tracing::debug;

use super::ExtractionError;

/// Maximum input image size (in bytes) before rejecting.
/// Prevents OOM on corrupt/adversarial files.
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024; // 50 MB

/// Longest edge handed to the OCR engine.
const MAX_OCR_DIMENSION: u32 = 4000;

/// Decode, grayscale, bound the size and re-encode as PNG.
pub fn preprocess_image(image_bytes: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    if image_bytes.len() > MAX_IMAGE_BYTES {
        return Err(ExtractionError::ImageProcessing(format!(
            "Image too large: {} bytes",
            image_bytes.len()
        )));
    }

    let img = image::load_from_memory(image_bytes)
        .map_err(|e| ExtractionError::ImageProcessing(format!("Decode failed: {e}")))?;

    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(ExtractionError::ImageProcessing("Image has no pixels".into()));
    }

    let img = bound_dimensions(img);
    let gray = DynamicImage::ImageLuma8(img.to_luma8());

    let mut out = Vec::new();
    gray.write_to(&mut out, ImageOutputFormat::Png)
        .map_err(|e| ExtractionError::ImageProcessing(format!("Encode failed: {e}")))?;

    debug!(
        width,
        height,
        output_bytes = out.len(),
        "Image normalised for OCR"
    );

    Ok(out)
}

fn bound_dimensions(img: DynamicImage) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width.max(height) <= MAX_OCR_DIMENSION {
        return img;
    }
    // resize() keeps the aspect ratio inside the bounding box
    img.resize(MAX_OCR_DIMENSION, MAX_OCR_DIMENSION, FilterType::Triangle)
}
