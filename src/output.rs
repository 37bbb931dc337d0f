//! CLI output formatting for every subcommand.
//!
//! Each result is shown as a header line naming the input and where it went,
//! followed by indented context lines:
//!
//! ```text
//! beach.png → out/beach.compressed.jpg
//!     1920x1080 jpeg @ 0.8
//!     2.4 MB → 412.7 KB (83% smaller)
//!
//! portrait.png → out/portrait.inpainted.png
//!     1024x768, method telea
//!
//! broken.png
//!     error: Failed to load image: unexpected end of file
//! ```
//!
//! Each entity has a `format_*` function (returns `Vec<String>`) for
//! testability and callers decide where the lines go. [`print_lines`] writes
//! them to stdout. Format functions are pure: no I/O, no side effects.

use crate::imaging::{CompressOutput, ExifData, ResizeOutput, ThumbnailOutput};
use crate::pool::{InpaintOutput, PoolStats, WorkerKind};
use crate::upload::format_file_size;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `input → output`, using only the input's file name.
fn header(input: &Path, output: &Path) -> String {
    format!("{} → {}", file_label(input), output.display())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Size change line: `1.2 MB → 300 KB (75% smaller)`.
fn size_change(before: u64, after: u64) -> String {
    let sizes = format!("{} → {}", format_file_size(before), format_file_size(after));
    if before == 0 || before == after {
        return sizes;
    }
    let (delta, word) = if after < before {
        (before - after, "smaller")
    } else {
        (after - before, "larger")
    };
    let percent = (delta as f64 / before as f64 * 100.0).round() as u64;
    format!("{sizes} ({percent}% {word})")
}

pub fn format_compress_result(
    input: &Path,
    output: &Path,
    input_size: u64,
    result: &CompressOutput,
) -> Vec<String> {
    vec![
        header(input, output),
        format!(
            "{}{}x{} {} @ {}",
            indent(1),
            result.width,
            result.height,
            result.format,
            result.quality
        ),
        format!(
            "{}{}",
            indent(1),
            size_change(input_size, result.compressed_size as u64)
        ),
    ]
}

pub fn format_resize_result(input: &Path, output: &Path, result: &ResizeOutput) -> Vec<String> {
    vec![
        header(input, output),
        format!(
            "{}{}x{} → {}x{} {}",
            indent(1),
            result.original_width,
            result.original_height,
            result.new_width,
            result.new_height,
            result.format
        ),
    ]
}

pub fn format_thumbnail_result(
    input: &Path,
    output: &Path,
    result: &ThumbnailOutput,
) -> Vec<String> {
    vec![
        header(input, output),
        format!(
            "{}{}x{} → {}x{}",
            indent(1),
            result.original_width,
            result.original_height,
            result.thumbnail_width,
            result.thumbnail_height
        ),
    ]
}

pub fn format_inpaint_result(input: &Path, output: &Path, result: &InpaintOutput) -> Vec<String> {
    vec![
        header(input, output),
        format!(
            "{}{}x{}, method {}",
            indent(1),
            result.width,
            result.height,
            result.method
        ),
    ]
}

/// A single written image from one of the canvas tools.
pub fn format_written(label: &str, output: &Path, dimensions: (u32, u32)) -> Vec<String> {
    vec![
        format!("{label} → {}", output.display()),
        format!("{}{}x{}", indent(1), dimensions.0, dimensions.1),
    ]
}

/// A failed input. The error text is shown verbatim.
pub fn format_failure(input: &Path, error: &str) -> Vec<String> {
    vec![file_label(input), format!("{}error: {error}", indent(1))]
}

/// One line per pool:
///
/// ```text
/// Pools
///     compress: 2 workers, 0 active, 0 queued
/// ```
pub fn format_pool_stats(stats: &[(WorkerKind, PoolStats)]) -> Vec<String> {
    let mut lines = vec!["Pools".to_string()];
    for (kind, s) in stats {
        lines.push(format!(
            "{}{}: {} workers, {} active, {} queued",
            indent(1),
            kind,
            s.total_workers,
            s.active_workers,
            s.queued_tasks
        ));
    }
    lines
}

/// Present the upright size and EXIF tags, one per line. Missing tags are
/// omitted.
pub fn format_exif(input: &Path, (width, height): (u32, u32), exif: &ExifData) -> Vec<String> {
    let mut lines = vec![file_label(input), format!("{}Size: {width}x{height}", indent(1))];
    if exif.is_empty() {
        lines.push(format!("{}no EXIF data", indent(1)));
        return lines;
    }

    let mut field = |name: &str, value: Option<String>| {
        if let Some(value) = value {
            lines.push(format!("{}{name}: {value}", indent(1)));
        }
    };
    field("Make", exif.make.clone());
    field("Model", exif.model.clone());
    field("Orientation", exif.orientation.map(|o| o.to_string()));
    field("Exposure", exif.exposure_time.map(format_exposure));
    field("Aperture", exif.f_number.map(|f| format!("f/{f}")));
    field("ISO", exif.iso.map(|i| i.to_string()));
    field("Taken", exif.date_time_original.clone());
    field("Exposure mode", exif.exposure_mode.map(|m| m.to_string()));
    field("White balance", exif.white_balance.map(|w| w.to_string()));
    field("Scene type", exif.scene_type.map(|s| s.to_string()));
    lines
}

/// Sub-second exposures read as `1/250s`.
fn format_exposure(seconds: f64) -> String {
    if seconds > 0.0 && seconds < 1.0 {
        format!("1/{}s", (1.0 / seconds).round())
    } else {
        format!("{seconds}s")
    }
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::OutputFormat;

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn size_change_reports_direction() {
        assert_eq!(size_change(2048, 1024), "2 KB → 1 KB (50% smaller)");
        assert_eq!(size_change(1024, 1536), "1 KB → 1.5 KB (50% larger)");
        assert_eq!(size_change(1024, 1024), "1 KB → 1 KB");
        assert_eq!(size_change(0, 10), "0 Bytes → 10 Bytes");
    }

    #[test]
    fn compress_result_lines() {
        let result = CompressOutput {
            compressed_data: String::new(),
            original_size: 0,
            compressed_size: 1024,
            width: 1920,
            height: 640,
            format: OutputFormat::Jpeg,
            quality: 0.8,
        };
        let lines = format_compress_result(
            Path::new("/photos/beach.png"),
            Path::new("out/beach.compressed.jpg"),
            4096,
            &result,
        );
        assert_eq!(
            lines,
            vec![
                "beach.png → out/beach.compressed.jpg",
                "    1920x640 jpeg @ 0.8",
                "    4 KB → 1 KB (75% smaller)",
            ]
        );
    }

    #[test]
    fn resize_and_thumbnail_lines() {
        let resized = ResizeOutput {
            resized_data: String::new(),
            original_width: 800,
            original_height: 600,
            new_width: 400,
            new_height: 300,
            format: OutputFormat::Webp,
            quality: 0.9,
        };
        let lines = format_resize_result(Path::new("a.png"), Path::new("a.resized.webp"), &resized);
        assert_eq!(lines[1], "    800x600 → 400x300 webp");

        let thumb = ThumbnailOutput {
            thumbnail_data: String::new(),
            original_width: 800,
            original_height: 600,
            thumbnail_width: 200,
            thumbnail_height: 150,
            quality: 0.8,
        };
        let lines = format_thumbnail_result(Path::new("a.png"), Path::new("a.thumb.jpg"), &thumb);
        assert_eq!(lines, vec!["a.png → a.thumb.jpg", "    800x600 → 200x150"]);
    }

    #[test]
    fn inpaint_line_shows_method() {
        let result = InpaintOutput {
            inpainted_data: String::new(),
            width: 64,
            height: 32,
            method: "navier-stokes".into(),
        };
        let lines = format_inpaint_result(Path::new("p.png"), Path::new("p.inpainted.png"), &result);
        assert_eq!(lines[1], "    64x32, method navier-stokes");
    }

    #[test]
    fn failure_lines() {
        let lines = format_failure(Path::new("dir/bad.png"), "Unsupported file type");
        assert_eq!(lines, vec!["bad.png", "    error: Unsupported file type"]);
    }

    #[test]
    fn pool_stats_lines() {
        let stats = vec![(
            WorkerKind::Compress,
            PoolStats {
                total_workers: 2,
                active_workers: 1,
                queued_tasks: 3,
                pool_size: 2,
            },
        )];
        assert_eq!(
            format_pool_stats(&stats),
            vec!["Pools", "    compress: 2 workers, 1 active, 3 queued"]
        );
    }

    #[test]
    fn exif_lines_skip_missing_tags() {
        let exif = ExifData {
            make: Some("Canon".into()),
            exposure_time: Some(0.004),
            f_number: Some(2.8),
            iso: Some(400),
            ..ExifData::default()
        };
        assert_eq!(
            format_exif(Path::new("img.jpg"), (3000, 4000), &exif),
            vec![
                "img.jpg",
                "    Size: 3000x4000",
                "    Make: Canon",
                "    Exposure: 1/250s",
                "    Aperture: f/2.8",
                "    ISO: 400",
            ]
        );
    }

    #[test]
    fn exif_empty() {
        assert_eq!(
            format_exif(Path::new("x.png"), (8, 6), &ExifData::default()),
            vec!["x.png", "    Size: 8x6", "    no EXIF data"]
        );
    }

    #[test]
    fn long_exposure_in_seconds() {
        assert_eq!(format_exposure(2.0), "2s");
        assert_eq!(format_exposure(0.5), "1/2s");
    }
}
