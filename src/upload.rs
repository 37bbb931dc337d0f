//! Input file validation.
//!
//! Files are identified by their magic bytes, never by extension, and checked
//! against the configured allow-list and size ceiling before any decoding.

use crate::config::UploadsConfig;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported file type")]
    UnsupportedType,
    #[error("File too large (max {})", format_megabytes(.max))]
    TooLarge { size: u64, max: u64 },
}

fn format_megabytes(bytes: &u64) -> String {
    format!("{}MB", bytes / (1024 * 1024))
}

/// A validated input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    pub mime_type: &'static str,
    pub size: u64,
}

/// Sniff the MIME type of `bytes` from its signature.
pub fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|f| f.to_mime_type())
}

/// Check `bytes` against the allow-list and size ceiling.
pub fn validate_bytes(bytes: &[u8], config: &UploadsConfig) -> Result<ValidatedUpload, UploadError> {
    let size = bytes.len() as u64;
    if size > config.max_file_size {
        return Err(UploadError::TooLarge {
            size,
            max: config.max_file_size,
        });
    }

    let mime_type = sniff_mime_type(bytes).ok_or(UploadError::UnsupportedType)?;
    if !config.allowed_types.iter().any(|t| t == mime_type) {
        return Err(UploadError::UnsupportedType);
    }
    Ok(ValidatedUpload { mime_type, size })
}

/// Read a file and validate it. The size is checked before reading.
pub fn read_validated(path: &Path, config: &UploadsConfig) -> Result<(Vec<u8>, ValidatedUpload), UploadError> {
    let size = std::fs::metadata(path)?.len();
    if size > config.max_file_size {
        return Err(UploadError::TooLarge {
            size,
            max: config.max_file_size,
        });
    }
    let bytes = std::fs::read(path)?;
    let upload = validate_bytes(&bytes, config)?;
    Ok((bytes, upload))
}

/// Human-readable byte count: `0 Bytes`, `1.5 KB`, `2.25 MB`.
///
/// Uses 1024-based units and at most two decimals, trailing zeros dropped.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && exponent < UNITS.len() - 1 {
        value /= 1024.0;
        exponent += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;

    let mut text = format!("{rounded:.2}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    format!("{text} {}", UNITS[exponent])
}
