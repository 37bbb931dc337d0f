//! Healing brush: clone pixels from an offset source region.

use super::{InpaintError, to_channel};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Centroid of the pixels whose selection alpha is non-zero.
fn selection_centre(selection: &[u8], width: u32) -> Option<Point> {
    let (mut sx, mut sy, mut n) = (0f64, 0f64, 0u64);
    for (i, px) in selection.chunks_exact(4).enumerate() {
        if px[3] > 0 {
            sx += (i as u32 % width) as f64;
            sy += (i as u32 / width) as f64;
            n += 1;
        }
    }
    (n > 0).then(|| Point {
        x: sx / n as f64,
        y: sy / n as f64,
    })
}

/// Blend every selected pixel toward the pixel at the same offset from
/// `source_point` as it has from the selection centre.
///
/// `selection` is an RGBA buffer matching `image`; its alpha is the blend
/// strength. Reads come from the unmodified input, so overlapping source and
/// target regions do not smear. Pixels whose source falls outside the image
/// are left alone.
pub fn heal_selection(
    image: &RgbaImage,
    selection: &[u8],
    source_point: Point,
) -> Result<RgbaImage, InpaintError> {
    let (width, height) = image.dimensions();
    let expected = width as usize * height as usize * 4;
    if selection.len() != expected {
        return Err(InpaintError::MaskLength {
            expected,
            actual: selection.len(),
        });
    }

    let mut out = image.clone();
    let Some(centre) = selection_centre(selection, width) else {
        return Ok(out);
    };

    for (i, px) in selection.chunks_exact(4).enumerate() {
        let alpha = px[3];
        if alpha == 0 {
            continue;
        }
        let x = i as u32 % width;
        let y = i as u32 / width;
        let sx = (source_point.x + (x as f64 - centre.x)).floor();
        let sy = (source_point.y + (y as f64 - centre.y)).floor();
        if sx < 0.0 || sy < 0.0 || sx >= width as f64 || sy >= height as f64 {
            continue;
        }

        let blend = alpha as f32 / 255.0;
        let target = image.get_pixel(x, y).0;
        let from = image.get_pixel(sx as u32, sy as u32).0;
        let dst = &mut out.get_pixel_mut(x, y).0;
        for c in 0..4 {
            dst[c] = to_channel(target[c] as f32 * (1.0 - blend) + from[c] as f32 * blend);
        }
    }

    Ok(out)
}
