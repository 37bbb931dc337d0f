//! Tool configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a user file in the config directory overrides any subset of
//! them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [pools]
//! compress = 2              # Worker threads per pool (clamped to CPU cores)
//! resize = 2
//! inpaint = 1
//!
//! [compress]
//! quality = 0.8             # 0-1, JPEG only
//! format = "jpeg"           # jpeg, png, webp
//! max_width = 1920
//! max_height = 1080
//!
//! [resize]
//! quality = 0.9
//! format = "jpeg"
//!
//! [thumbnail]
//! max_size = 200            # Longest edge in pixels
//! quality = 0.8
//!
//! [inpaint]
//! method = "telea"          # telea, navier-stokes, simple
//! inpaint_radius = 3.0
//! search_radius = 10
//! iterations = 10
//!
//! [uploads]
//! max_file_size = 52428800  # 50 MB
//! allowed_types = ["image/jpeg", "image/jpg", "image/png", "image/webp", "image/gif", "image/bmp"]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::OutputFormat;
use crate::inpaint::{InpaintMethod, InpaintSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageboxConfig {
    /// Worker counts per pool.
    pub pools: PoolsConfig,
    /// Defaults for the `compress` operation.
    pub compress: CompressConfig,
    /// Defaults for the `resize` operation.
    pub resize: ResizeConfig,
    /// Defaults for the `thumbnail` operation.
    pub thumbnail: ThumbnailConfig,
    /// Inpainting method and tunables.
    pub inpaint: InpaintConfig,
    /// Input file checks.
    pub uploads: UploadsConfig,
}

/// Largest accepted `inpaint.search_radius`. The search window is a square
/// of side `2r + 1` around every masked pixel.
pub const MAX_SEARCH_RADIUS: u32 = 256;

fn check_quality(name: &str, quality: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&quality) {
        return Err(ConfigError::Validation(format!("{name} must be 0-1")));
    }
    Ok(())
}

fn check_positive(name: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!("{name} must be positive")));
    }
    Ok(())
}

impl ImageboxConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_quality("compress.quality", self.compress.quality)?;
        check_quality("resize.quality", self.resize.quality)?;
        check_quality("thumbnail.quality", self.thumbnail.quality)?;

        check_positive("pools.compress", self.pools.compress as u64)?;
        check_positive("pools.resize", self.pools.resize as u64)?;
        check_positive("pools.inpaint", self.pools.inpaint as u64)?;

        check_positive("compress.max_width", self.compress.max_width.into())?;
        check_positive("compress.max_height", self.compress.max_height.into())?;
        check_positive("thumbnail.max_size", self.thumbnail.max_size.into())?;
        check_positive("inpaint.search_radius", self.inpaint.search_radius.into())?;
        if self.inpaint.search_radius > MAX_SEARCH_RADIUS {
            return Err(ConfigError::Validation(format!(
                "inpaint.search_radius must be at most {MAX_SEARCH_RADIUS}"
            )));
        }
        check_positive("uploads.max_file_size", self.uploads.max_file_size)?;

        if !(self.inpaint.inpaint_radius.is_finite() && self.inpaint.inpaint_radius > 0.0) {
            return Err(ConfigError::Validation(
                "inpaint.inpaint_radius must be positive".into(),
            ));
        }
        if self.uploads.allowed_types.is_empty() {
            return Err(ConfigError::Validation(
                "uploads.allowed_types must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Worker counts for each pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolsConfig {
    pub compress: usize,
    pub resize: usize,
    pub inpaint: usize,
}

impl Default for PoolsConfig {
    fn default() -> Self {
        Self {
            compress: 2,
            resize: 2,
            inpaint: 1,
        }
    }
}

/// Resolve the effective worker count for a pool.
///
/// The user can constrain down, not up: requests above the core count are
/// clamped, and the result is never below one.
pub fn effective_workers(requested: usize) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    requested.min(cores).max(1)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressConfig {
    /// Encoder quality as a 0–1 fraction.
    pub quality: f32,
    pub format: OutputFormat,
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            quality: 0.8,
            format: OutputFormat::Jpeg,
            max_width: 1920,
            max_height: 1080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub quality: f32,
    pub format: OutputFormat,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            quality: 0.9,
            format: OutputFormat::Jpeg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailConfig {
    /// Longest edge of the thumbnail, in pixels.
    pub max_size: u32,
    pub quality: f32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_size: 200,
            quality: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InpaintConfig {
    /// Default method when a request does not name one.
    pub method: InpaintMethod,
    pub inpaint_radius: f32,
    pub search_radius: u32,
    pub iterations: u32,
}

impl Default for InpaintConfig {
    fn default() -> Self {
        let settings = InpaintSettings::default();
        Self {
            method: InpaintMethod::Telea,
            inpaint_radius: settings.inpaint_radius,
            search_radius: settings.search_radius,
            iterations: settings.iterations,
        }
    }
}

impl InpaintConfig {
    pub fn settings(&self) -> InpaintSettings {
        InpaintSettings {
            inpaint_radius: self.inpaint_radius,
            search_radius: self.search_radius,
            iterations: self.iterations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsConfig {
    /// Largest accepted input, in bytes.
    pub max_file_size: u64,
    /// MIME types accepted as input.
    pub allowed_types: Vec<String>,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            allowed_types: [
                "image/jpeg",
                "image/jpg",
                "image/png",
                "image/webp",
                "image/gif",
                "image/bmp",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

// =============================================================================
// Layering
// =============================================================================

/// Every default as a TOML table. User files are merged onto this.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ImageboxConfig::default())?)
}

/// Layer `overlay` onto `base`. Nested tables combine per key, so
/// `[pools] compress = 4` leaves `pools.resize` at its default. Any other
/// overlay value, arrays included, wins outright.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Parse `dir/config.toml` without applying defaults. A missing file is
/// `None`; malformed TOML is an error.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Turn layered TOML into a checked [`ImageboxConfig`].
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ImageboxConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ImageboxConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Stock defaults, overridden by `dir/config.toml` when present.
pub fn load_config(dir: &Path) -> Result<ImageboxConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// A documented stock `config.toml` with all keys and their defaults.
pub fn stock_config_toml() -> &'static str {
    r##"# imagebox configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as config.toml in the directory passed to --config
# (the current directory by default). Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Worker pools
# ---------------------------------------------------------------------------
[pools]
# Worker threads per pool. Values above the CPU core count are clamped down.
compress = 2
resize = 2
inpaint = 1

# ---------------------------------------------------------------------------
# Compression
# ---------------------------------------------------------------------------
[compress]
# Encoder quality from 0 (worst) to 1 (best). Only JPEG is lossy.
quality = 0.8

# Output format: "jpeg", "png" or "webp" (lossless).
format = "jpeg"

# Larger images are scaled down to fit; smaller ones are never enlarged.
max_width = 1920
max_height = 1080

# ---------------------------------------------------------------------------
# Resize
# ---------------------------------------------------------------------------
[resize]
quality = 0.9
format = "jpeg"

# ---------------------------------------------------------------------------
# Thumbnails (always JPEG)
# ---------------------------------------------------------------------------
[thumbnail]
# Longest edge in pixels.
max_size = 200
quality = 0.8

# ---------------------------------------------------------------------------
# Object removal
# ---------------------------------------------------------------------------
[inpaint]
# "telea" (nearest boundary), "navier-stokes" (diffusion) or "simple"
# (neighbour average). Unknown names fall back to "simple".
method = "telea"

# telea: boundary distance that still receives colour.
inpaint_radius = 3.0

# telea: half-width of the window searched for known pixels (1-256).
search_radius = 10

# navier-stokes: number of smoothing passes.
iterations = 10

# ---------------------------------------------------------------------------
# Input validation
# ---------------------------------------------------------------------------
[uploads]
# Largest accepted file in bytes (50 MB).
max_file_size = 52428800
allowed_types = ["image/jpeg", "image/jpg", "image/png", "image/webp", "image/gif", "image/bmp"]
"##
}
