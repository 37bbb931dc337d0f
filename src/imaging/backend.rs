//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four primitives every pipeline is
//! built from: identify, decode, resample, and encode. Pipelines in
//! [`operations`](super::operations) only ever talk to this trait, so they can
//! be exercised against [`tests::MockBackend`] without real codecs.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image` crate.

use super::params::{OutputFormat, Quality};
use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to load image: {0}")]
    Decode(String),
    #[error("{format} encode failed: {reason}")]
    Encode {
        format: OutputFormat,
        reason: String,
    },
    #[error("Invalid data URL: {0}")]
    DataUrl(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Trait for image processing backends.
///
/// Decoded surfaces are always RGBA8 so every downstream operation (filters,
/// inpainting, compositing) sees the same pixel layout.
pub trait ImageBackend: Send + Sync {
    /// Get image dimensions without a full decode where the format allows it.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode encoded bytes into an RGBA surface, upright per EXIF orientation.
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, BackendError>;

    /// Resample to exactly `width`×`height` with high-quality filtering.
    fn resample(&self, image: &RgbaImage, width: u32, height: u32) -> RgbaImage;

    /// Encode a surface. `quality` only affects lossy formats.
    fn encode(
        &self,
        image: &RgbaImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;
}
