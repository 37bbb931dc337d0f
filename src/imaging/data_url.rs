//! `data:` URL parsing and formatting.
//!
//! Task payloads carry images as `data:<mime>;base64,<payload>` strings.
//! Only the base64 form is accepted.

use super::backend::BackendError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// A decoded data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Parse a base64 data URL into its MIME type and raw bytes.
pub fn parse_data_url(url: &str) -> Result<DataUrl, BackendError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| BackendError::DataUrl("missing data: prefix".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| BackendError::DataUrl("missing ',' separator".into()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| BackendError::DataUrl("only base64 data URLs are supported".into()))?;

    // Tolerate line-wrapped payloads
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| BackendError::DataUrl(e.to_string()))?;

    Ok(DataUrl {
        mime_type: mime_type.to_string(),
        bytes,
    })
}

/// Format raw bytes as a base64 data URL.
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_png_url() {
        let parsed = parse_data_url("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(parsed.mime_type, "image/png");
        assert_eq!(parsed.bytes, b"hello");
    }

    #[test]
    fn formats_and_parses_back() {
        let url = to_data_url("image/jpeg", &[0xFF, 0xD8, 0xFF]);
        assert_eq!(url, "data:image/jpeg;base64,/9j/");
        assert_eq!(parse_data_url(&url).unwrap().bytes, vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn rejects_non_data_urls() {
        assert!(parse_data_url("https://example.com/a.png").is_err());
        assert!(parse_data_url("data:image/png;base64").is_err());
        assert!(parse_data_url("data:text/plain,hello").is_err());
        assert!(parse_data_url("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn ignores_wrapped_whitespace() {
        let parsed = parse_data_url("data:image/gif;base64,aGVs\nbG8=").unwrap();
        assert_eq!(parsed.bytes, b"hello");
    }
}
