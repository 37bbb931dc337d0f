//! Object removal by inpainting.
//!
//! Every strategy takes an RGBA source plus a [`Mask`] of the same size and
//! returns a fresh buffer. Pixels outside the mask are copied byte for byte,
//! and the outermost rows and columns are never written.
//!
//! | Method name | Strategy |
//! |---|---|
//! | `simple` (and anything unrecognised) | [`neighbor::neighbor_average`] |
//! | `telea` | [`telea::boundary_weighted`] |
//! | `navier-stokes` | [`diffusion::diffuse`] |
//!
//! The healing brush in [`heal`] is a separate operation: it clones pixels
//! from an offset source region instead of synthesising them.

pub mod diffusion;
pub mod heal;
pub mod mask;
pub mod neighbor;
pub mod telea;

pub use heal::{Point, heal_selection};
pub use mask::Mask;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InpaintError {
    #[error("mask has {actual} bytes, expected {expected}")]
    MaskLength { expected: usize, actual: usize },
    #[error("mask is {}x{} but image is {}x{}", .mask.0, .mask.1, .image.0, .image.1)]
    DimensionMismatch { image: (u32, u32), mask: (u32, u32) },
}

/// Fill strategy, selected by name.
///
/// Parsing never fails: unknown names (including `content-aware`) select
/// [`InpaintMethod::NeighborAverage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InpaintMethod {
    NeighborAverage,
    #[default]
    Telea,
    NavierStokes,
}

impl FromStr for InpaintMethod {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "telea" => InpaintMethod::Telea,
            "navier-stokes" => InpaintMethod::NavierStokes,
            _ => InpaintMethod::NeighborAverage,
        })
    }
}

impl From<String> for InpaintMethod {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(method) => method,
            Err(never) => match never {},
        }
    }
}

impl From<InpaintMethod> for String {
    fn from(method: InpaintMethod) -> Self {
        method.to_string()
    }
}

impl fmt::Display for InpaintMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InpaintMethod::NeighborAverage => "simple",
            InpaintMethod::Telea => "telea",
            InpaintMethod::NavierStokes => "navier-stokes",
        })
    }
}

/// Tunables for the fill strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InpaintSettings {
    /// Telea: maximum boundary distance that still receives colour.
    pub inpaint_radius: f32,
    /// Telea: half-width of the square window searched for known pixels.
    pub search_radius: u32,
    /// Navier-Stokes: number of diffusion passes.
    pub iterations: u32,
}

impl Default for InpaintSettings {
    fn default() -> Self {
        Self {
            inpaint_radius: 3.0,
            search_radius: 10,
            iterations: 10,
        }
    }
}

/// Fill the masked region of `image` with the chosen strategy.
pub fn inpaint(
    image: &RgbaImage,
    mask: &Mask,
    method: InpaintMethod,
    settings: &InpaintSettings,
) -> Result<RgbaImage, InpaintError> {
    mask.ensure_matches(image)?;
    log::debug!(
        "inpainting {} of {} pixels with {method}",
        mask.count(),
        image.width() as u64 * image.height() as u64
    );
    Ok(match method {
        InpaintMethod::NeighborAverage => neighbor::neighbor_average(image, mask),
        InpaintMethod::Telea => {
            telea::boundary_weighted(image, mask, settings.inpaint_radius, settings.search_radius)
        }
        InpaintMethod::NavierStokes => diffusion::diffuse(image, mask, settings.iterations),
    })
}

/// Clamp to 0–255 and round half to even, matching a clamped byte store.
#[inline]
pub(crate) fn to_channel(value: f32) -> u8 {
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

/// Whether `(x, y)` is strictly inside the one-pixel frame.
#[inline]
pub(crate) fn is_interior(x: u32, y: u32, width: u32, height: u32) -> bool {
    x > 0 && y > 0 && x + 1 < width && y + 1 < height
}
