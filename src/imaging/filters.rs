//! Per-pixel colour filters. Alpha is never touched.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    Grayscale,
    Sepia,
    Invert,
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Filter::Grayscale => "grayscale",
            Filter::Sepia => "sepia",
            Filter::Invert => "invert",
        })
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grayscale" | "greyscale" => Ok(Filter::Grayscale),
            "sepia" => Ok(Filter::Sepia),
            "invert" => Ok(Filter::Invert),
            other => Err(format!("Unknown filter: {other}")),
        }
    }
}

fn to_channel(value: f32) -> u8 {
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

/// Apply `filter` in place.
pub fn apply_filter(image: &mut RgbaImage, filter: Filter) {
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let (r, g, b) = (r as f32, g as f32, b as f32);
        let rgb = match filter {
            Filter::Grayscale => {
                let gray = to_channel(0.299 * r + 0.587 * g + 0.114 * b);
                [gray, gray, gray]
            }
            Filter::Sepia => [
                to_channel(0.393 * r + 0.769 * g + 0.189 * b),
                to_channel(0.349 * r + 0.686 * g + 0.168 * b),
                to_channel(0.272 * r + 0.534 * g + 0.131 * b),
            ],
            Filter::Invert => [
                255 - pixel.0[0],
                255 - pixel.0[1],
                255 - pixel.0[2],
            ],
        };
        pixel.0[..3].copy_from_slice(&rgb);
    }
}
