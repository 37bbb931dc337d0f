//! Iterative Laplacian smoothing, a simplified take on Navier-Stokes inpainting.

use super::{Mask, is_interior, to_channel};
use image::RgbaImage;

/// Run `iterations` Gauss-Seidel passes over the masked interior.
///
/// Each pass walks the image in row-major order and sets every channel to
/// half its value plus half the mean of its 4-neighbours. Neighbour values
/// are read from the buffer being written, so a pixel sees updates made
/// earlier in the same pass; this makes the sweep inherently sequential.
pub fn diffuse(source: &RgbaImage, mask: &Mask, iterations: u32) -> RgbaImage {
    let (width, height) = source.dimensions();
    let mut out = source.clone();

    for _ in 0..iterations {
        for y in 0..height {
            for x in 0..width {
                if !mask.is_masked(x, y) || !is_interior(x, y, width, height) {
                    continue;
                }
                let centre = out.get_pixel(x, y).0;
                let up = out.get_pixel(x, y - 1).0;
                let down = out.get_pixel(x, y + 1).0;
                let left = out.get_pixel(x - 1, y).0;
                let right = out.get_pixel(x + 1, y).0;

                let mut next = [0u8; 4];
                for c in 0..4 {
                    let mean =
                        (up[c] as f32 + down[c] as f32 + left[c] as f32 + right[c] as f32) / 4.0;
                    next[c] = to_channel(centre[c] as f32 * 0.5 + mean * 0.5);
                }
                out.get_pixel_mut(x, y).0 = next;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn bright_frame_dark_hole() -> (RgbaImage, Mask) {
        let mut image = RgbaImage::from_pixel(5, 5, Rgba([200, 200, 200, 255]));
        let mut mask = Mask::new(5, 5);
        for y in 1..4 {
            for x in 1..4 {
                image.put_pixel(x, y, Rgba([0, 0, 0, 255]));
                mask.set(x, y, true);
            }
        }
        (image, mask)
    }

    #[test]
    fn zero_iterations_is_identity() {
        let (image, mask) = bright_frame_dark_hole();
        assert_eq!(diffuse(&image, &mask, 0), image);
    }

    #[test]
    fn single_pass_sees_earlier_updates() {
        let (image, mask) = bright_frame_dark_hole();
        let out = diffuse(&image, &mask, 1);

        // (1,1): up=200, left=200, right=0, down=0 → 0.5*0 + 0.5*100 = 50
        assert_eq!(out.get_pixel(1, 1).0[0], 50);
        // (2,1): up=200, left=50 (already updated), right=0, down=0 → 31.25 → 31
        assert_eq!(out.get_pixel(2, 1).0[0], 31);
        // Alpha stays 255 everywhere
        assert!(out.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn more_iterations_keep_smoothing() {
        let (image, mask) = bright_frame_dark_hole();
        let centre = |n| diffuse(&image, &mask, n).get_pixel(2, 2).0[0];

        let (a, b, c) = (centre(1), centre(5), centre(20));
        assert!(a < b && b < c, "expected {a} < {b} < {c}");
        assert!(c <= 200);
    }
}
