//! Nearest-boundary fill, a simplified take on Telea's method.
//!
//! Each masked pixel looks for the closest unmasked pixel inside a square
//! search window. The boundary distance is the Euclidean distance minus one,
//! so a pixel touching the known region sits at distance 0 and takes the
//! neighbour's colour outright. Beyond `inpaint_radius` nothing is written.

use super::{Mask, is_interior, to_channel};
use image::RgbaImage;
use rayon::prelude::*;

/// Closest unmasked pixel to `(x, y)` within `radius`, scanning rows top to
/// bottom. Ties keep the first hit.
fn nearest_known(mask: &Mask, x: u32, y: u32, radius: u32) -> Option<(u32, u32, f32)> {
    let (width, height) = mask.dimensions();
    let x0 = x.saturating_sub(radius);
    let y0 = y.saturating_sub(radius);
    let x1 = x.saturating_add(radius).min(width - 1);
    let y1 = y.saturating_add(radius).min(height - 1);

    let mut best: Option<(u32, u32, f32)> = None;
    for ny in y0..=y1 {
        for nx in x0..=x1 {
            if mask.is_masked(nx, ny) {
                continue;
            }
            let dx = nx as f32 - x as f32;
            let dy = ny as f32 - y as f32;
            let distance = (dx * dx + dy * dy).sqrt();
            if best.is_none_or(|(_, _, d)| distance < d) {
                best = Some((nx, ny, distance));
            }
        }
    }
    best
}

/// Blend masked interior pixels toward their nearest known neighbour.
pub fn boundary_weighted(
    source: &RgbaImage,
    mask: &Mask,
    inpaint_radius: f32,
    search_radius: u32,
) -> RgbaImage {
    let (width, height) = source.dimensions();
    let mut out = source.clone();
    let row_len = width as usize * 4;
    if row_len == 0 {
        return out;
    }

    out.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as u32;
            for x in 0..width {
                if !mask.is_masked(x, y) || !is_interior(x, y, width, height) {
                    continue;
                }
                let Some((nx, ny, euclidean)) = nearest_known(mask, x, y, search_radius) else {
                    continue;
                };

                let distance = (euclidean - 1.0).max(0.0);
                if distance > inpaint_radius {
                    continue;
                }
                let weight = if inpaint_radius > 0.0 {
                    1.0 - distance / inpaint_radius
                } else {
                    1.0
                };

                let here = source.get_pixel(x, y).0;
                let there = source.get_pixel(nx, ny).0;
                let px = &mut row[x as usize * 4..x as usize * 4 + 4];
                for c in 0..4 {
                    let blended = here[c] as f32 * (1.0 - weight) + there[c] as f32 * weight;
                    px[c] = to_channel(blended);
                }
            }
        });

    out
}
