use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::domain::{AppError, Quality};

#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
}

/// Downscales to a maximum width and re-encodes as JPEG.
#[derive(Debug, Clone)]
pub struct Compressor {
    max_width: u32,
}

impl Compressor {
    pub fn new(max_width: u32) -> Self {
        Self { max_width }
    }

    /// Re-decodes `data` on a blocking worker and encodes the result.
    pub async fn compress(
        &self,
        data: Bytes,
        quality: Quality,
    ) -> Result<CompressedImage, AppError> {
        let compressor = self.clone();
        tokio::task::spawn_blocking(move || compressor.compress_bytes(&data, quality))
            .await
            .map_err(|e| AppError::TaskJoin(e.to_string()))?
    }

    pub fn compress_bytes(
        &self,
        data: &[u8],
        quality: Quality,
    ) -> Result<CompressedImage, AppError> {
        let img = image::load_from_memory(data).map_err(|e| AppError::Decode(e.to_string()))?;
        let (width, height) = target_dimensions(img.width(), img.height(), self.max_width);

        let resized = if (width, height) == (img.width(), img.height()) {
            img
        } else {
            img.resize_exact(width, height, FilterType::Triangle)
        };

        // JPEG has no alpha channel
        let rgb = resized.to_rgb8();
        let mut buffer = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality.jpeg_quality());
        encoder
            .encode_image(&rgb)
            .map_err(|e| AppError::Encode(e.to_string()))?;

        log::debug!(
            "Encoded {}x{} JPEG at q={} ({} bytes)",
            width,
            height,
            quality.jpeg_quality(),
            buffer.len()
        );

        Ok(CompressedImage {
            bytes: Bytes::from(buffer),
            width,
            height,
        })
    }
}

/// Output size for an image constrained to `max_width`. Never upscales.
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }

    let scaled = (height as f64 * max_width as f64 / width as f64).round() as u32;
    (max_width, scaled.max(1))
}
