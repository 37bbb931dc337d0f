//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take payload parameters, compute target sizes, and call the backend.
//! Nothing here touches the filesystem: inputs and outputs are data URLs or
//! in-memory surfaces.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{
    calculate_bounded_dimensions, calculate_merge_layout, calculate_resize_dimensions,
    calculate_thumbnail_dimensions, clip_crop,
};
use super::data_url::{parse_data_url, to_data_url};
use super::params::{
    Background, CompressParams, CropParams, MergeParams, OutputFormat, Quality, ResizeParams,
    ThumbnailParams,
};
use image::{Rgba, RgbaImage, imageops};
use serde::{Deserialize, Serialize};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Result of a `compress` task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressOutput {
    pub compressed_data: String,
    /// Length of the input data URL.
    pub original_size: usize,
    /// Encoded byte count.
    pub compressed_size: usize,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub quality: f32,
}

/// Result of a `resize` task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeOutput {
    pub resized_data: String,
    pub original_width: u32,
    pub original_height: u32,
    pub new_width: u32,
    pub new_height: u32,
    pub format: OutputFormat,
    pub quality: f32,
}

/// Result of a `thumbnail` task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailOutput {
    pub thumbnail_data: String,
    pub original_width: u32,
    pub original_height: u32,
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
    pub quality: f32,
}

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, bytes: &[u8]) -> Result<(u32, u32)> {
    let dims = backend.identify(bytes)?;
    Ok((dims.width, dims.height))
}

/// Decode the image carried by a data URL.
pub fn decode_data_url(backend: &impl ImageBackend, url: &str) -> Result<RgbaImage> {
    let parsed = parse_data_url(url)?;
    backend.decode(&parsed.bytes)
}

/// Encode a surface and wrap it in a data URL.
pub fn encode_data_url(
    backend: &impl ImageBackend,
    image: &RgbaImage,
    format: OutputFormat,
    quality: Quality,
) -> Result<(String, usize)> {
    let bytes = backend.encode(image, format, quality)?;
    Ok((to_data_url(format.mime_type(), &bytes), bytes.len()))
}

/// Decode, bound the dimensions (never upscale), and re-encode.
pub fn compress_image(backend: &impl ImageBackend, params: &CompressParams) -> Result<CompressOutput> {
    let source = decode_data_url(backend, &params.image_data)?;
    let (width, height) =
        calculate_bounded_dimensions(source.dimensions(), params.max_width, params.max_height);

    let scaled = backend.resample(&source, width, height);
    let quality = Quality::from_fraction(params.quality);
    let bytes = backend.encode(&scaled, params.format, quality)?;

    Ok(CompressOutput {
        original_size: params.image_data.len(),
        compressed_size: bytes.len(),
        compressed_data: to_data_url(params.format.mime_type(), &bytes),
        width,
        height,
        format: params.format,
        quality: params.quality,
    })
}

/// Resize to explicit targets, then apply the optional bounds.
pub fn resize_image(backend: &impl ImageBackend, params: &ResizeParams) -> Result<ResizeOutput> {
    let source = decode_data_url(backend, &params.image_data)?;
    let original = source.dimensions();

    let target = calculate_resize_dimensions(
        original,
        params.width,
        params.height,
        params.maintain_aspect_ratio,
    );
    let (new_width, new_height) =
        calculate_bounded_dimensions(target, params.max_width, params.max_height);

    let resized = backend.resample(&source, new_width, new_height);
    let (resized_data, _) = encode_data_url(
        backend,
        &resized,
        params.format,
        Quality::from_fraction(params.quality),
    )?;

    Ok(ResizeOutput {
        resized_data,
        original_width: original.0,
        original_height: original.1,
        new_width,
        new_height,
        format: params.format,
        quality: params.quality,
    })
}

/// Create a JPEG thumbnail whose longer edge is `max_size`.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    params: &ThumbnailParams,
) -> Result<ThumbnailOutput> {
    let source = decode_data_url(backend, &params.image_data)?;
    let original = source.dimensions();
    let (thumbnail_width, thumbnail_height) =
        calculate_thumbnail_dimensions(original, params.max_size);

    let thumb = backend.resample(&source, thumbnail_width, thumbnail_height);
    let (thumbnail_data, _) = encode_data_url(
        backend,
        &thumb,
        OutputFormat::Jpeg,
        Quality::from_fraction(params.quality),
    )?;

    Ok(ThumbnailOutput {
        thumbnail_data,
        original_width: original.0,
        original_height: original.1,
        thumbnail_width,
        thumbnail_height,
        quality: params.quality,
    })
}

/// Copy out the part of `image` inside the crop rectangle.
pub fn crop_image(image: &RgbaImage, crop: CropParams) -> Result<RgbaImage> {
    let (x, y, width, height) = clip_crop(image.dimensions(), crop.x, crop.y, crop.width, crop.height)
        .ok_or_else(|| {
            BackendError::InvalidInput(format!(
                "crop rectangle {}x{}+{}+{} is outside the {}x{} image",
                crop.width,
                crop.height,
                crop.x,
                crop.y,
                image.width(),
                image.height()
            ))
        })?;
    Ok(imageops::crop_imm(image, x, y, width, height).to_image())
}

/// Composite images end to end on one canvas.
pub fn merge_images(images: &[RgbaImage], params: &MergeParams) -> Result<RgbaImage> {
    if images.is_empty() {
        return Err(BackendError::InvalidInput(
            "merge needs at least one image".into(),
        ));
    }

    let sizes: Vec<(u32, u32)> = images.iter().map(|i| i.dimensions()).collect();
    let layout = calculate_merge_layout(&sizes, params.direction, params.spacing, params.alignment);

    let fill = match params.background {
        Background::Transparent => Rgba([0, 0, 0, 0]),
        Background::Rgb([r, g, b]) => Rgba([r, g, b, 255]),
    };
    let mut canvas = RgbaImage::from_pixel(layout.width, layout.height, fill);
    for (image, placement) in images.iter().zip(&layout.placements) {
        imageops::overlay(&mut canvas, image, placement.x as i64, placement.y as i64);
    }
    Ok(canvas)
}

/// An opaque black surface.
pub fn black_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width.max(1), height.max(1), Rgba([0, 0, 0, 255]))
}
