//! EXIF tags and orientation correction.
//!
//! Container parsing is done by `kamadak-exif`. We keep a handful of camera
//! tags: Make, Model, Orientation, ExposureTime, FNumber, ISO,
//! DateTimeOriginal, ExposureMode, WhiteBalance, SceneType. Tags from the
//! Exif sub-IFD are reported under the primary image.
//!
//! Reading never fails loudly: malformed or missing data yields
//! [`ExifData::default`].

use ::exif::{In, Reader, Tag, Value};
use image::{RgbaImage, imageops};
use serde::Serialize;

/// EXIF tags extracted from an image.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExifData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f_number: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time_original: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_mode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_balance: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_type: Option<u32>,
}

impl ExifData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Orientation tag, defaulting to 1 (upright).
    pub fn orientation_or_default(&self) -> u16 {
        self.orientation.unwrap_or(1)
    }
}

/// Read EXIF tags from raw file bytes (JPEG, TIFF, PNG, WebP or HEIF
/// containers). Input without a readable EXIF block yields empty data.
pub fn read_exif(bytes: &[u8]) -> ExifData {
    let mut cursor = std::io::Cursor::new(bytes);
    let Ok(exif) = Reader::new().read_from_container(&mut cursor) else {
        return ExifData::default();
    };
    let field = |tag: Tag| exif.get_field(tag, In::PRIMARY).map(|f| &f.value);

    ExifData {
        make: field(Tag::Make).and_then(ascii),
        model: field(Tag::Model).and_then(ascii),
        orientation: field(Tag::Orientation)
            .and_then(|v| v.get_uint(0))
            .and_then(|o| u16::try_from(o).ok()),
        exposure_time: field(Tag::ExposureTime).and_then(rational),
        f_number: field(Tag::FNumber).and_then(rational),
        iso: field(Tag::PhotographicSensitivity).and_then(|v| v.get_uint(0)),
        date_time_original: field(Tag::DateTimeOriginal).and_then(ascii),
        exposure_mode: field(Tag::ExposureMode).and_then(|v| v.get_uint(0)),
        white_balance: field(Tag::WhiteBalance).and_then(|v| v.get_uint(0)),
        scene_type: field(Tag::SceneType).and_then(undefined_byte),
    }
}

fn ascii(value: &Value) -> Option<String> {
    let Value::Ascii(parts) = value else {
        return None;
    };
    let text = String::from_utf8_lossy(parts.first()?)
        .trim_end_matches('\0')
        .trim()
        .to_string();
    (!text.is_empty()).then_some(text)
}

fn rational(value: &Value) -> Option<f64> {
    let Value::Rational(parts) = value else {
        return None;
    };
    Some(parts.first()?.to_f64()).filter(|v| v.is_finite())
}

/// SceneType is stored as a single UNDEFINED byte.
fn undefined_byte(value: &Value) -> Option<u32> {
    match value {
        Value::Undefined(bytes, _) => bytes.first().map(|&b| b as u32),
        other => other.get_uint(0),
    }
}

// ---------------------------------------------------------------------------
// Orientation correction
// ---------------------------------------------------------------------------

/// Rotate/flip a decoded surface so it displays upright.
///
/// | Tag | Transform |
/// |---|---|
/// | 1 | none |
/// | 2 | flip horizontal |
/// | 3 | rotate 180° |
/// | 4 | flip vertical |
/// | 5 | transpose (rotate 90° CW + flip horizontal) |
/// | 6 | rotate 90° CW |
/// | 7 | transverse (rotate 270° CW + flip horizontal) |
/// | 8 | rotate 270° CW |
pub fn apply_orientation(image: RgbaImage, orientation: u16) -> RgbaImage {
    match orientation {
        2 => imageops::flip_horizontal(&image),
        3 => imageops::rotate180(&image),
        4 => imageops::flip_vertical(&image),
        5 => imageops::flip_horizontal(&imageops::rotate90(&image)),
        6 => imageops::rotate90(&image),
        7 => imageops::flip_horizontal(&imageops::rotate270(&image)),
        8 => imageops::rotate270(&image),
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const EXIF_HEADER: &[u8] = b"Exif\0\0";

    /// Build a little-endian TIFF block with the given IFD0 entries.
    ///
    /// Each entry is (tag, type, count, value-or-offset). Extra data is
    /// appended after the IFD and referenced by absolute TIFF offset.
    fn tiff_le(entries: &[(u16, u16, u32, u32)], extra: &[u8]) -> Vec<u8> {
        let mut t = Vec::new();
        t.extend_from_slice(b"II");
        t.extend_from_slice(&42u16.to_le_bytes());
        t.extend_from_slice(&8u32.to_le_bytes());
        t.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        for &(tag, typ, count, value) in entries {
            t.extend_from_slice(&tag.to_le_bytes());
            t.extend_from_slice(&typ.to_le_bytes());
            t.extend_from_slice(&count.to_le_bytes());
            t.extend_from_slice(&value.to_le_bytes());
        }
        t.extend_from_slice(&0u32.to_le_bytes());
        t.extend_from_slice(extra);
        t
    }

    fn jpeg_with_app1(tiff: &[u8]) -> Vec<u8> {
        let mut jpeg = vec![0xFF, 0xD8];
        // Unrelated APP0 first, to make sure we skip segments correctly
        jpeg.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00]);
        let len = (2 + EXIF_HEADER.len() + tiff.len()) as u16;
        jpeg.extend_from_slice(&[0xFF, 0xE1]);
        jpeg.extend_from_slice(&len.to_be_bytes());
        jpeg.extend_from_slice(EXIF_HEADER);
        jpeg.extend_from_slice(tiff);
        jpeg.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02, 0xFF, 0xD9]);
        jpeg
    }

    #[test]
    fn non_jpeg_returns_default() {
        assert!(read_exif(b"\x89PNG\r\n\x1a\n").is_empty());
        assert!(read_exif(&[]).is_empty());
    }

    #[test]
    fn jpeg_without_exif_returns_default() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xDA, 0x00, 0x02, 0xFF, 0xD9];
        assert!(read_exif(&jpeg).is_empty());
    }

    #[test]
    fn reads_inline_orientation() {
        // Orientation SHORT, count 1, value stored inline
        let tiff = tiff_le(&[(Tag::Orientation.number(), 3, 1, 6)], &[]);
        let exif = read_exif(&jpeg_with_app1(&tiff));
        assert_eq!(exif.orientation, Some(6));
        assert_eq!(exif.orientation_or_default(), 6);
    }

    #[test]
    fn reads_ascii_and_rational_by_offset() {
        // IFD at 8: 2 + 2*12 + 4 = 30 bytes → extra data starts at offset 38
        let mut extra = Vec::new();
        extra.extend_from_slice(b"Canon\0"); // offset 38, 6 bytes
        extra.extend_from_slice(&28u32.to_le_bytes()); // offset 44: FNumber 28/10
        extra.extend_from_slice(&10u32.to_le_bytes());
        let tiff = tiff_le(&[(Tag::Make.number(), 2, 6, 38), (Tag::FNumber.number(), 5, 1, 44)], &extra);

        let exif = read_exif(&jpeg_with_app1(&tiff));
        assert_eq!(exif.make.as_deref(), Some("Canon"));
        assert_eq!(exif.f_number, Some(2.8));
    }

    #[test]
    fn follows_exif_sub_ifd() {
        // IFD0 with one entry: 2 + 12 + 4 = 18 bytes → sub-IFD at 26
        let mut sub = Vec::new();
        sub.extend_from_slice(&1u16.to_le_bytes());
        sub.extend_from_slice(&Tag::PhotographicSensitivity.number().to_le_bytes());
        sub.extend_from_slice(&3u16.to_le_bytes());
        sub.extend_from_slice(&1u32.to_le_bytes());
        sub.extend_from_slice(&400u32.to_le_bytes());
        sub.extend_from_slice(&0u32.to_le_bytes());
        let tiff = tiff_le(&[(Tag::ExifIFDPointer.number(), 4, 1, 26)], &sub);

        let exif = read_exif(&jpeg_with_app1(&tiff));
        assert_eq!(exif.iso, Some(400));
    }

    #[test]
    fn truncated_tiff_is_tolerated() {
        let mut tiff = tiff_le(&[(Tag::Orientation.number(), 3, 1, 3), (Tag::Make.number(), 2, 10, 500)], &[]);
        tiff.truncate(20);
        let exif = read_exif(&jpeg_with_app1(&tiff));
        assert_eq!(exif.make, None);
    }

    #[test]
    fn orientation_six_rotates_clockwise() {
        // 2x1: red on the left, blue on the right
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 255, 255]));

        let rotated = apply_orientation(image, 6);
        assert_eq!(rotated.dimensions(), (1, 2));
        // After a clockwise quarter turn the left pixel ends up on top
        assert_eq!(rotated.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(rotated.get_pixel(0, 1), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn orientation_one_is_identity() {
        let image = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 4]));
        assert_eq!(apply_orientation(image.clone(), 1), image);
        assert_eq!(apply_orientation(image.clone(), 42), image);
    }
}
