//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! the task payloads (camelCase JSON coming off the pool envelope) and the
//! [`backend`](super::backend), which does the actual pixel work.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100). Payloads carry it as a 0–1 fraction.
//! - [`OutputFormat`] — Encoder selection (`jpeg`, `png`, `webp`).
//! - [`CompressParams`], [`ResizeParams`], [`ThumbnailParams`] — pipeline payloads.
//! - [`CropParams`], [`MergeParams`], [`Background`] — canvas tool parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    /// Map a 0–1 fraction onto the encoder scale.
    pub fn from_fraction(fraction: f32) -> Self {
        let fraction = if fraction.is_finite() { fraction } else { 1.0 };
        Self::new((fraction.clamp(0.0, 1.0) * 100.0).round() as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Encoders compiled into the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
    Webp,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Webp => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::Webp),
            other => Err(format!("Unsupported output format: {other}")),
        }
    }
}

fn default_compress_quality() -> f32 {
    0.8
}

fn default_resize_quality() -> f32 {
    0.9
}

fn default_thumbnail_quality() -> f32 {
    0.8
}

fn default_thumbnail_size() -> u32 {
    200
}

fn default_true() -> bool {
    true
}

/// Payload of a `compress` task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressParams {
    /// Encoded source image as a data URL.
    pub image_data: String,
    #[serde(default = "default_compress_quality")]
    pub quality: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
    #[serde(default)]
    pub format: OutputFormat,
}

/// Payload of a `resize` task.
///
/// `width`/`height` are explicit targets; `maxWidth`/`maxHeight` bound the
/// result and never upscale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeParams {
    pub image_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
    #[serde(default = "default_true")]
    pub maintain_aspect_ratio: bool,
    #[serde(default = "default_resize_quality")]
    pub quality: f32,
    #[serde(default)]
    pub format: OutputFormat,
}

/// Payload of a `thumbnail` task. Thumbnails are always JPEG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailParams {
    pub image_data: String,
    #[serde(default = "default_thumbnail_size")]
    pub max_size: u32,
    #[serde(default = "default_thumbnail_quality")]
    pub quality: f32,
}

/// Crop rectangle in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropParams {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeDirection {
    #[default]
    Horizontal,
    Vertical,
}

/// Cross-axis placement of each image in a merge.
///
/// `Start` is top (horizontal merges) or left (vertical merges).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[serde(alias = "top", alias = "left")]
    Start,
    #[default]
    Center,
    #[serde(alias = "bottom", alias = "right")]
    End,
}

impl FromStr for MergeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "horizontal" | "h" => Ok(MergeDirection::Horizontal),
            "vertical" | "v" => Ok(MergeDirection::Vertical),
            other => Err(format!("Unknown merge direction: {other}")),
        }
    }
}

impl FromStr for Alignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start" | "top" | "left" => Ok(Alignment::Start),
            "center" | "centre" => Ok(Alignment::Center),
            "end" | "bottom" | "right" => Ok(Alignment::End),
            other => Err(format!("Unknown alignment: {other}")),
        }
    }
}

/// Merge canvas fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Background {
    #[default]
    Transparent,
    Rgb([u8; 3]),
}

impl FromStr for Background {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("transparent") {
            return Ok(Background::Transparent);
        }
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| format!("Invalid background colour: {s}"))?;
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        Ok(Background::Rgb([channel(0), channel(2), channel(4)]))
    }
}

/// Parameters for merging several images onto one canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeParams {
    pub direction: MergeDirection,
    pub spacing: u32,
    pub alignment: Alignment,
    pub background: Background,
}
