//! Binary fill masks.

use super::InpaintError;
use image::RgbaImage;

/// Per-pixel "fill me" flags, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// An empty mask: nothing selected.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    /// Build a mask from an RGBA byte buffer. A pixel is masked when its
    /// alpha byte is non-zero; the colour bytes are ignored.
    pub fn from_rgba_alpha(bytes: &[u8], width: u32, height: u32) -> Result<Self, InpaintError> {
        let expected = width as usize * height as usize * 4;
        if bytes.len() != expected {
            return Err(InpaintError::MaskLength {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            width,
            height,
            bits: bytes.chunks_exact(4).map(|px| px[3] > 0).collect(),
        })
    }

    /// Same rule as [`Mask::from_rgba_alpha`], reading an already decoded surface.
    pub fn from_image(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            bits: image.pixels().map(|p| p.0[3] > 0).collect(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn is_masked(&self, x: u32, y: u32) -> bool {
        self.bits[y as usize * self.width as usize + x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, masked: bool) {
        let index = y as usize * self.width as usize + x as usize;
        self.bits[index] = masked;
    }

    /// Number of masked pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub(super) fn ensure_matches(&self, image: &RgbaImage) -> Result<(), InpaintError> {
        if image.dimensions() != self.dimensions() {
            return Err(InpaintError::DimensionMismatch {
                image: image.dimensions(),
                mask: self.dimensions(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_channel_selects_pixels() {
        // 2x1: first pixel transparent (with colour), second alpha 1
        let bytes = [255, 255, 255, 0, 0, 0, 0, 1];
        let mask = Mask::from_rgba_alpha(&bytes, 2, 1).unwrap();
        assert!(!mask.is_masked(0, 0));
        assert!(mask.is_masked(1, 0));
        assert_eq!(mask.count(), 1);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = Mask::from_rgba_alpha(&[0; 12], 2, 2).unwrap_err();
        assert!(matches!(
            err,
            InpaintError::MaskLength {
                expected: 16,
                actual: 12
            }
        ));
    }

    #[test]
    fn decoded_surface_matches_raw_bytes() {
        let mut image = RgbaImage::from_pixel(3, 2, image::Rgba([200, 10, 10, 0]));
        image.put_pixel(1, 0, image::Rgba([0, 0, 0, 255]));
        image.put_pixel(2, 1, image::Rgba([9, 9, 9, 3]));

        let mask = Mask::from_image(&image);
        assert_eq!(mask.count(), 2);
        assert!(mask.is_masked(1, 0) && mask.is_masked(2, 1));
        assert_eq!(mask, Mask::from_rgba_alpha(image.as_raw(), 3, 2).unwrap());
        assert_eq!(Mask::from_image(&RgbaImage::new(3, 2)).count(), 0);
    }

    #[test]
    fn set_and_query() {
        let mut mask = Mask::new(3, 3);
        mask.set(2, 1, true);
        assert!(mask.is_masked(2, 1));
        assert!(!mask.is_masked(1, 2));
    }
}
