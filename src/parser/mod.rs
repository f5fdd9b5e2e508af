//! XML 1.0 parser.
//!
//! A hand-rolled recursive descent parser that builds a [`Document`]. It
//! reads everything a configuration file is likely to contain (XML
//! declaration, DOCTYPE, comments, processing instructions, CDATA, prefixed
//! names) and keeps it in the tree so that sorting and re-serializing loses
//! nothing but insignificant whitespace.
//!
//! In recovery mode, well-formedness errors that leave the tree
//! unambiguous are recorded as diagnostics on the document instead of
//! aborting the parse.

pub(crate) mod input;
mod xml;

use crate::error::ParseError;
use crate::tree::Document;

use input::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_NAME_LENGTH};

/// Parse options.
///
/// Use the builder pattern to configure options:
///
/// ```
/// use sortxml::parser::ParseOptions;
///
/// let opts = ParseOptions::default()
///     .recover(true)
///     .no_blanks(true)
///     .max_depth(128);
/// assert!(opts.no_blanks);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Record recoverable errors as diagnostics instead of failing.
    pub recover: bool,
    /// Drop whitespace-only text nodes inside elements.
    pub no_blanks: bool,
    /// Maximum element nesting depth (default: 256).
    pub max_depth: u32,
    /// Maximum length in bytes of an element or attribute name (default: 50,000).
    pub max_name_length: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            recover: false,
            no_blanks: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn recover(mut self, yes: bool) -> Self {
        self.recover = yes;
        self
    }

    #[must_use]
    pub fn no_blanks(mut self, yes: bool) -> Self {
        self.no_blanks = yes;
        self
    }

    #[must_use]
    pub fn max_depth(mut self, max: u32) -> Self {
        self.max_depth = max;
        self
    }

    #[must_use]
    pub fn max_name_length(mut self, max: usize) -> Self {
        self.max_name_length = max;
        self
    }
}

/// Parses an XML string with default options.
///
/// # Errors
///
/// Returns `ParseError` if the input is not well-formed XML.
pub fn parse_str(input: &str) -> Result<Document, ParseError> {
    parse_str_with_options(input, &ParseOptions::default())
}

/// Parses an XML string with the given options.
///
/// A leading byte order mark is ignored.
///
/// # Errors
///
/// Returns `ParseError` if the input is not well-formed XML and recovery
/// mode is not enabled, or if the error is one recovery cannot skip.
pub fn parse_str_with_options(input: &str, options: &ParseOptions) -> Result<Document, ParseError> {
    let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
    let doc = xml::XmlParser::new(input, options).parse()?;
    log::trace!(
        "parsed {} nodes ({} diagnostics)",
        doc.node_count(),
        doc.diagnostics.len()
    );
    Ok(doc)
}
