//! Input decoding.
//!
//! Configuration files come in whatever encoding the producing tool chose,
//! so input bytes are sniffed for a byte order mark and an XML declaration
//! `encoding=` pseudo-attribute before being transcoded to UTF-8 with
//! `encoding_rs`. Output is always written as UTF-8.

use std::fmt;

/// An error that occurs while decoding input bytes.
#[derive(Debug, Clone)]
pub struct EncodingError {
    pub message: String,
}

impl EncodingError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "encoding error: {}", self.message)
    }
}

impl std::error::Error for EncodingError {}

/// Detects the encoding indicated by a byte order mark.
///
/// Returns the encoding label and the number of BOM bytes to skip. Input
/// without a BOM is assumed to be UTF-8.
///
/// ```
/// use sortxml::encoding::detect_bom;
///
/// assert_eq!(detect_bom(b"\xEF\xBB\xBF<a/>"), ("UTF-8", 3));
/// assert_eq!(detect_bom(b"\xFF\xFE<\x00"), ("UTF-16LE", 2));
/// assert_eq!(detect_bom(b"<a/>"), ("UTF-8", 0));
/// ```
#[must_use]
pub fn detect_bom(bytes: &[u8]) -> (&'static str, usize) {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => ("UTF-8", 3),
        [0xFE, 0xFF, ..] => ("UTF-16BE", 2),
        [0xFF, 0xFE, ..] => ("UTF-16LE", 2),
        _ => ("UTF-8", 0),
    }
}

/// Transcodes `bytes` from the encoding named by `label` into a `String`.
///
/// # Errors
///
/// Returns `EncodingError` if the label is unknown to `encoding_rs` or the
/// bytes are malformed for that encoding.
pub fn transcode(bytes: &[u8], label: &str) -> Result<String, EncodingError> {
    let encoding = encoding_rs::Encoding::for_label(label.as_bytes())
        .ok_or_else(|| EncodingError::new(format!("unsupported encoding: {label}")))?;
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(EncodingError::new(format!(
            "malformed byte sequence for encoding {label}"
        )));
    }
    Ok(text.into_owned())
}

/// Decodes raw XML bytes to UTF-8.
///
/// The BOM decides the initial encoding. When the (initially decoded) text
/// starts with an XML declaration naming a different, ASCII-compatible
/// encoding, the bytes are decoded again with the declared encoding.
///
/// # Errors
///
/// Returns `EncodingError` if the bytes are not valid in the detected or
/// declared encoding.
pub fn decode_to_utf8(bytes: &[u8]) -> Result<String, EncodingError> {
    let (bom_label, skip) = detect_bom(bytes);
    let content = &bytes[skip..];

    if bom_label != "UTF-8" {
        return transcode(content, bom_label);
    }

    // The declaration is ASCII, so it can be read before knowing the encoding.
    let head = &content[..content.len().min(256)];
    let declared = declared_encoding(&String::from_utf8_lossy(head));

    match declared {
        Some(label) if !is_utf8_label(&label) && skip == 0 => transcode(content, &label),
        _ => std::str::from_utf8(content)
            .map(str::to_string)
            .map_err(|e| EncodingError::new(format!("input is not valid UTF-8: {e}"))),
    }
}

pub(crate) fn is_utf8_label(label: &str) -> bool {
    matches!(
        label.to_ascii_lowercase().as_str(),
        "utf-8" | "utf8" | "us-ascii" | "ascii"
    )
}

/// Reads the `encoding` pseudo-attribute of a leading XML declaration.
fn declared_encoding(text: &str) -> Option<String> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    if !text.starts_with("<?xml") {
        return None;
    }
    let decl = &text[..text.find("?>")?];
    let after = decl[decl.find("encoding")? + "encoding".len()..].trim_start();
    let after = after.strip_prefix('=')?.trim_start();
    let quote = after.chars().next().filter(|&c| c == '"' || c == '\'')?;
    let value = &after[1..];
    Some(value[..value.find(quote)?].to_string())
}
