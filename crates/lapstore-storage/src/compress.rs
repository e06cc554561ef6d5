//! JPEG re-encoding of product photos before upload.

use std::io::Cursor;

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use lapstore_core::{AppConfig, BackendError, ImageCompressor, ImageFile};

use crate::error::StorageError;

/// Lowest quality the encoder steps down to while chasing the size target.
const MIN_QUALITY: u8 = 40;
const QUALITY_STEP: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSettings {
    /// Longest edge after resizing, in pixels.
    pub max_dimension: u32,
    /// Size the encoder tries to get under, in bytes.
    pub target_bytes: usize,
    /// Starting JPEG quality, 1 to 100.
    pub quality: u8,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            max_dimension: 1920,
            target_bytes: 1024 * 1024,
            quality: 85,
        }
    }
}

impl CompressionSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_dimension: config.image_max_dimension,
            target_bytes: config.image_target_bytes,
            quality: config.image_jpeg_quality,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCompressor {
    settings: CompressionSettings,
}

impl JpegCompressor {
    #[must_use]
    pub fn new(settings: CompressionSettings) -> Self {
        Self { settings }
    }

    /// Decodes, downsizes and re-encodes `file` as JPEG on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Decode`] if `file` is not a decodable image,
    /// [`StorageError::Encode`] if JPEG encoding fails, or
    /// [`StorageError::Task`] if the blocking task panics.
    pub async fn compress_file(&self, file: &ImageFile) -> Result<ImageFile, StorageError> {
        let settings = self.settings;
        let file = file.clone();
        tokio::task::spawn_blocking(move || compress_blocking(&file, settings)).await?
    }
}

/// Synchronous core of [`JpegCompressor::compress_file`].
///
/// Returns the original file unchanged when re-encoding would not make it
/// smaller and no resize was needed. GIFs and images with transparent pixels
/// are also kept as uploaded, since JPEG has neither frames nor alpha.
///
/// # Errors
///
/// See [`JpegCompressor::compress_file`].
pub fn compress_blocking(
    file: &ImageFile,
    settings: CompressionSettings,
) -> Result<ImageFile, StorageError> {
    if matches!(image::guess_format(&file.bytes), Ok(ImageFormat::Gif)) {
        return Ok(keep_original(file, "gif may be animated"));
    }

    let decoded = image::load_from_memory(&file.bytes).map_err(|e| StorageError::Decode {
        file_name: file.file_name.clone(),
        source: e,
    })?;
    if has_transparency(&decoded) {
        return Ok(keep_original(file, "image has transparent pixels"));
    }

    let resized = decoded.width() > settings.max_dimension
        || decoded.height() > settings.max_dimension;
    let img = if resized {
        decoded.resize(
            settings.max_dimension,
            settings.max_dimension,
            FilterType::Lanczos3,
        )
    } else {
        decoded
    };

    let mut quality = settings.quality.clamp(1, 100);
    let mut encoded = encode_jpeg(&img, quality)?;
    while encoded.len() > settings.target_bytes && quality > MIN_QUALITY {
        quality = quality.saturating_sub(QUALITY_STEP).max(MIN_QUALITY);
        encoded = encode_jpeg(&img, quality)?;
    }

    if !resized && encoded.len() >= file.bytes.len() {
        return Ok(keep_original(file, "re-encoding would not shrink image"));
    }

    tracing::debug!(
        file_name = %file.file_name,
        original_bytes = file.bytes.len(),
        compressed_bytes = encoded.len(),
        quality,
        width = img.width(),
        height = img.height(),
        "image compressed"
    );

    Ok(ImageFile::new(
        jpeg_file_name(&file.file_name),
        "image/jpeg",
        encoded,
    ))
}

fn keep_original(file: &ImageFile, reason: &str) -> ImageFile {
    tracing::debug!(file_name = %file.file_name, reason, "keeping original image");
    file.clone()
}

fn has_transparency(img: &DynamicImage) -> bool {
    img.color().has_alpha() && img.to_rgba8().pixels().any(|p| p.0[3] < u8::MAX)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, StorageError> {
    let mut buffer = Vec::new();
    let rgb = img.to_rgb8();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buffer), quality);
    rgb.write_with_encoder(encoder).map_err(StorageError::Encode)?;
    Ok(buffer)
}

fn jpeg_file_name(original: &str) -> String {
    let stem = match original.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => original,
    };
    format!("{stem}.jpg")
}

#[async_trait]
impl ImageCompressor for JpegCompressor {
    async fn compress(&self, file: &ImageFile) -> Result<ImageFile, BackendError> {
        Ok(self.compress_file(file).await?)
    }
}
