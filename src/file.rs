//! Loading and saving documents on disk.
//!
//! These helpers pair the byte-level pieces (encoding detection, parsing,
//! serialization) with a path so that every failure reports which file it
//! concerns. Saved files are always UTF-8 and end with a newline.

use std::path::Path;

use crate::encoding;
use crate::error::Error;
use crate::parser::{self, ParseOptions};
use crate::serial::{self, SerializeOptions};
use crate::tree::Document;

/// Reads and parses the file at `path`.
///
/// # Errors
///
/// Returns [`Error::Read`] if the file cannot be read, and otherwise the
/// errors of [`decode_document`].
pub fn read_document(path: &Path, options: &ParseOptions) -> Result<Document, Error> {
    let bytes = std::fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    decode_document(&bytes, path, options)
}

/// Decodes and parses raw bytes. `path` only labels errors.
///
/// # Errors
///
/// Returns [`Error::Encoding`] if the bytes cannot be decoded and
/// [`Error::Parse`] if the text is not well-formed XML.
pub fn decode_document(bytes: &[u8], path: &Path, options: &ParseOptions) -> Result<Document, Error> {
    let text = encoding::decode_to_utf8(bytes).map_err(|source| Error::Encoding {
        path: path.to_path_buf(),
        source,
    })?;
    let mut doc = parser::parse_str_with_options(&text, options).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    // Output is always UTF-8, so the declaration must say so.
    if doc.encoding.as_deref().is_some_and(|label| !encoding::is_utf8_label(label)) {
        doc.encoding = Some("UTF-8".to_string());
    }
    log::debug!("loaded {} ({} bytes)", path.display(), bytes.len());
    Ok(doc)
}

/// Serializes `doc` as file contents: the serialized text plus a final
/// newline.
#[must_use]
pub fn render(doc: &Document, options: &SerializeOptions) -> String {
    let mut text = serial::serialize_with_options(doc, options);
    text.push('\n');
    text
}

/// Writes `doc` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`Error::Write`] if the file cannot be written.
pub fn write_document(doc: &Document, path: &Path, options: &SerializeOptions) -> Result<(), Error> {
    std::fs::write(path, render(doc, options)).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("wrote {}", path.display());
    Ok(())
}
