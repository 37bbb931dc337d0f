//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! Intermediate math is done in `f64` and rounded once at the end, so
//! chained bounds do not accumulate rounding error.

use super::params::{Alignment, MergeDirection};

/// Scale down to fit `max_width`/`max_height`, never up.
///
/// The width bound is applied first, then the height bound on the already
/// scaled result. Either bound may be absent.
///
/// # Examples
/// ```
/// # use imagebox::imaging::calculate_bounded_dimensions;
/// // 4000x3000 bounded to 1920x1080 → height is the binding constraint
/// assert_eq!(calculate_bounded_dimensions((4000, 3000), Some(1920), Some(1080)), (1440, 1080));
///
/// // Already inside the bounds → unchanged
/// assert_eq!(calculate_bounded_dimensions((800, 600), Some(1920), Some(1080)), (800, 600));
/// ```
pub fn calculate_bounded_dimensions(
    original: (u32, u32),
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> (u32, u32) {
    let mut width = original.0 as f64;
    let mut height = original.1 as f64;

    if let Some(max_w) = max_width.filter(|&m| m > 0).map(f64::from) {
        if width > max_w {
            height = height * max_w / width;
            width = max_w;
        }
    }

    if let Some(max_h) = max_height.filter(|&m| m > 0).map(f64::from) {
        if height > max_h {
            width = width * max_h / height;
            height = max_h;
        }
    }

    (round_dimension(width), round_dimension(height))
}

/// Calculate explicit resize targets.
///
/// With `maintain_aspect` set:
/// - width only → height follows the source ratio
/// - height only → width follows the source ratio
/// - both → the largest size that fits inside the `width`×`height` box
///
/// Without it, the given axes are used as-is and a missing axis keeps its
/// original size. With neither target the original size is returned.
pub fn calculate_resize_dimensions(
    original: (u32, u32),
    width: Option<u32>,
    height: Option<u32>,
    maintain_aspect: bool,
) -> (u32, u32) {
    let (orig_w, orig_h) = (original.0 as f64, original.1 as f64);
    let width = width.filter(|&w| w > 0).map(f64::from);
    let height = height.filter(|&h| h > 0).map(f64::from);

    let (w, h) = match (width, height, maintain_aspect) {
        (None, None, _) => (orig_w, orig_h),
        (Some(w), None, true) => (w, orig_h * w / orig_w),
        (None, Some(h), true) => (orig_w * h / orig_h, h),
        (Some(w), Some(h), true) => {
            let source_ratio = orig_w / orig_h;
            let target_ratio = w / h;
            if source_ratio > target_ratio {
                // Source is wider: width binds
                (w, w / source_ratio)
            } else {
                (h * source_ratio, h)
            }
        }
        (w, h, false) => (w.unwrap_or(orig_w), h.unwrap_or(orig_h)),
    };

    (round_dimension(w), round_dimension(h))
}

/// Calculate thumbnail dimensions: the longer edge becomes `max_size`.
///
/// Square sources are treated as portrait (height binds), matching the
/// behaviour users already see in the thumbnail tool.
///
/// # Examples
/// ```
/// # use imagebox::imaging::calculate_thumbnail_dimensions;
/// assert_eq!(calculate_thumbnail_dimensions((1600, 900), 200), (200, 113));
/// assert_eq!(calculate_thumbnail_dimensions((900, 1600), 200), (113, 200));
/// ```
pub fn calculate_thumbnail_dimensions(original: (u32, u32), max_size: u32) -> (u32, u32) {
    let (orig_w, orig_h) = (original.0 as f64, original.1 as f64);
    let max = max_size.max(1) as f64;

    if orig_w > orig_h {
        (round_dimension(max), round_dimension(orig_h * max / orig_w))
    } else {
        (round_dimension(orig_w * max / orig_h), round_dimension(max))
    }
}

/// Position of one image inside a merged canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

/// Canvas size plus per-image placement for a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeLayout {
    pub width: u32,
    pub height: u32,
    pub placements: Vec<Placement>,
}

/// Lay out images end to end along `direction`, separated by `spacing`.
///
/// The cross axis is the largest image's extent; smaller images are placed
/// according to `alignment`. Centre offsets are floored.
pub fn calculate_merge_layout(
    sizes: &[(u32, u32)],
    direction: MergeDirection,
    spacing: u32,
    alignment: Alignment,
) -> MergeLayout {
    let max_w = sizes.iter().map(|s| s.0).max().unwrap_or(0);
    let max_h = sizes.iter().map(|s| s.1).max().unwrap_or(0);
    let gaps = spacing * (sizes.len().saturating_sub(1) as u32);

    let cross_offset = |extent: u32, max: u32| match alignment {
        Alignment::Start => 0,
        Alignment::Center => (max - extent) / 2,
        Alignment::End => max - extent,
    };

    let mut cursor = 0;
    let placements = sizes
        .iter()
        .map(|&(w, h)| {
            let placement = match direction {
                MergeDirection::Horizontal => Placement {
                    x: cursor,
                    y: cross_offset(h, max_h),
                },
                MergeDirection::Vertical => Placement {
                    x: cross_offset(w, max_w),
                    y: cursor,
                },
            };
            cursor += match direction {
                MergeDirection::Horizontal => w + spacing,
                MergeDirection::Vertical => h + spacing,
            };
            placement
        })
        .collect();

    let (width, height) = match direction {
        MergeDirection::Horizontal => (sizes.iter().map(|s| s.0).sum::<u32>() + gaps, max_h),
        MergeDirection::Vertical => (max_w, sizes.iter().map(|s| s.1).sum::<u32>() + gaps),
    };

    MergeLayout {
        width,
        height,
        placements,
    }
}

/// Intersect a crop rectangle with the image bounds.
///
/// Returns `None` when the intersection is empty.
pub fn clip_crop(
    image: (u32, u32),
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Option<(u32, u32, u32, u32)> {
    if x >= image.0 || y >= image.1 {
        return None;
    }
    let w = width.min(image.0 - x);
    let h = height.min(image.1 - y);
    (w > 0 && h > 0).then_some((x, y, w, h))
}

fn round_dimension(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // calculate_bounded_dimensions tests
    // =========================================================================

    #[test]
    fn bounded_never_upscales() {
        assert_eq!(
            calculate_bounded_dimensions((640, 480), Some(1920), Some(1080)),
            (640, 480)
        );
    }

    #[test]
    fn bounded_width_only() {
        // 3000x2000 → 1500 wide, height 2000 * 1500/3000 = 1000
        assert_eq!(
            calculate_bounded_dimensions((3000, 2000), Some(1500), None),
            (1500, 1000)
        );
    }

    #[test]
    fn bounded_height_applied_after_width() {
        // Width step: 2000x4000 → 1000x2000; height step: → 500x1000
        assert_eq!(
            calculate_bounded_dimensions((2000, 4000), Some(1000), Some(1000)),
            (500, 1000)
        );
    }

    #[test]
    fn bounded_without_limits_is_identity() {
        assert_eq!(calculate_bounded_dimensions((123, 45), None, None), (123, 45));
    }

    #[test]
    fn bounded_rounds_fractional_height() {
        // 1000x333 → 500 x 166.5 → 167
        assert_eq!(
            calculate_bounded_dimensions((1000, 333), Some(500), None),
            (500, 167)
        );
    }

    // =========================================================================
    // calculate_resize_dimensions tests
    // =========================================================================

    #[test]
    fn resize_width_only_keeps_ratio() {
        // round(1080 * 1280 / 1920) = 720
        assert_eq!(
            calculate_resize_dimensions((1920, 1080), Some(1280), None, true),
            (1280, 720)
        );
    }

    #[test]
    fn resize_width_only_rounds_height() {
        // round(1000 * 300 / 700) = round(428.57) = 429
        assert_eq!(
            calculate_resize_dimensions((700, 1000), Some(300), None, true),
            (300, 429)
        );
    }

    #[test]
    fn resize_height_only_keeps_ratio() {
        assert_eq!(
            calculate_resize_dimensions((1920, 1080), None, Some(540), true),
            (960, 540)
        );
    }

    #[test]
    fn resize_box_fit_wide_source() {
        // 2:1 source into 400x400 box → 400x200
        assert_eq!(
            calculate_resize_dimensions((1000, 500), Some(400), Some(400), true),
            (400, 200)
        );
    }

    #[test]
    fn resize_box_fit_tall_source() {
        assert_eq!(
            calculate_resize_dimensions((500, 1000), Some(400), Some(400), true),
            (200, 400)
        );
    }

    #[test]
    fn resize_without_aspect_uses_targets() {
        assert_eq!(
            calculate_resize_dimensions((1000, 500), Some(300), Some(300), false),
            (300, 300)
        );
        assert_eq!(
            calculate_resize_dimensions((1000, 500), Some(300), None, false),
            (300, 500)
        );
    }

    #[test]
    fn resize_can_upscale_explicitly() {
        assert_eq!(
            calculate_resize_dimensions((100, 50), Some(400), None, true),
            (400, 200)
        );
    }

    // =========================================================================
    // calculate_thumbnail_dimensions tests
    // =========================================================================

    #[test]
    fn thumbnail_landscape() {
        assert_eq!(calculate_thumbnail_dimensions((4000, 3000), 200), (200, 150));
    }

    #[test]
    fn thumbnail_portrait() {
        assert_eq!(calculate_thumbnail_dimensions((3000, 4000), 200), (150, 200));
    }

    #[test]
    fn thumbnail_square() {
        assert_eq!(calculate_thumbnail_dimensions((500, 500), 200), (200, 200));
    }

    #[test]
    fn thumbnail_extreme_strip_keeps_one_pixel() {
        assert_eq!(calculate_thumbnail_dimensions((5000, 10), 200), (200, 1));
    }

    // =========================================================================
    // calculate_merge_layout tests
    // =========================================================================

    #[test]
    fn merge_horizontal_centered() {
        let layout = calculate_merge_layout(
            &[(100, 50), (60, 81)],
            MergeDirection::Horizontal,
            10,
            Alignment::Center,
        );
        assert_eq!((layout.width, layout.height), (170, 81));
        assert_eq!(layout.placements[0], Placement { x: 0, y: 15 });
        assert_eq!(layout.placements[1], Placement { x: 110, y: 0 });
    }

    #[test]
    fn merge_vertical_right_aligned() {
        let layout = calculate_merge_layout(
            &[(100, 50), (60, 80)],
            MergeDirection::Vertical,
            0,
            Alignment::End,
        );
        assert_eq!((layout.width, layout.height), (100, 130));
        assert_eq!(layout.placements[0], Placement { x: 0, y: 0 });
        assert_eq!(layout.placements[1], Placement { x: 40, y: 50 });
    }

    #[test]
    fn merge_single_image_has_no_gap() {
        let layout =
            calculate_merge_layout(&[(30, 20)], MergeDirection::Horizontal, 25, Alignment::Start);
        assert_eq!((layout.width, layout.height), (30, 20));
    }

    // =========================================================================
    // clip_crop tests
    // =========================================================================

    #[test]
    fn crop_inside_bounds_unchanged() {
        assert_eq!(clip_crop((100, 100), 10, 20, 30, 40), Some((10, 20, 30, 40)));
    }

    #[test]
    fn crop_clipped_to_edges() {
        assert_eq!(clip_crop((100, 80), 90, 70, 50, 50), Some((90, 70, 10, 10)));
    }

    #[test]
    fn crop_outside_is_none() {
        assert_eq!(clip_crop((100, 80), 100, 0, 10, 10), None);
        assert_eq!(clip_crop((100, 80), 0, 0, 0, 10), None);
    }
}
