//! Image processing — pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **EXIF** | `kamadak-exif` (primary image tags) + `imageops` orientation |
//! | **Compress / Resize / Thumbnail** | Lanczos3 + JPEG/PNG/WebP encoders |
//! | **Crop / Merge / Black** | `imageops::crop_imm`, `imageops::overlay` |
//! | **Filters** | per-pixel grayscale, sepia, invert |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Task payloads and tool parameters
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod data_url;
pub mod exif;
pub mod filters;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    MergeLayout, Placement, calculate_bounded_dimensions, calculate_merge_layout,
    calculate_resize_dimensions, calculate_thumbnail_dimensions,
};
pub use data_url::{DataUrl, parse_data_url, to_data_url};
pub use self::exif::{ExifData, read_exif};
pub use filters::{Filter, apply_filter};
pub use operations::{
    CompressOutput, ResizeOutput, ThumbnailOutput, black_image, compress_image, create_thumbnail,
    crop_image, decode_data_url, encode_data_url, get_dimensions, merge_images, resize_image,
};
pub use params::{
    Alignment, Background, CompressParams, CropParams, MergeDirection, MergeParams, OutputFormat,
    Quality, ResizeParams, ThumbnailParams,
};
pub use rust_backend::RustBackend;
