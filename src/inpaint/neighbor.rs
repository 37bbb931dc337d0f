//! Single-pass 8-neighbour averaging.

use super::{Mask, is_interior, to_channel};
use image::RgbaImage;
use rayon::prelude::*;

const NEIGHBOURS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Replace each masked interior pixel with the mean of its unmasked
/// 8-neighbours, all four channels. Reads only `source`, so rows are
/// independent and processed in parallel. A pixel whose neighbours are all
/// masked keeps its value.
pub fn neighbor_average(source: &RgbaImage, mask: &Mask) -> RgbaImage {
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

                let mut sum = [0f32; 4];
                let mut count = 0u32;
                for (dx, dy) in NEIGHBOURS {
                    let nx = (x as i64 + dx) as u32;
                    let ny = (y as i64 + dy) as u32;
                    if mask.is_masked(nx, ny) {
                        continue;
                    }
                    for (acc, &v) in sum.iter_mut().zip(&source.get_pixel(nx, ny).0) {
                        *acc += v as f32;
                    }
                    count += 1;
                }
                if count == 0 {
                    continue;
                }

                let px = &mut row[x as usize * 4..x as usize * 4 + 4];
                for (dst, acc) in px.iter_mut().zip(sum) {
                    *dst = to_channel(acc / count as f32);
                }
            }
        });

    out
}
