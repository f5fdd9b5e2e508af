//! Error types and diagnostics.
//!
//! Parsing failures carry a [`SourceLocation`] so the command-line tool can
//! point at the offending line. The sorting core itself never fails; the
//! only fallible layers are reading, decoding, parsing and writing, which
//! are aggregated into the crate-level [`Error`].

use std::fmt;
use std::path::PathBuf;

use crate::encoding::EncodingError;

/// Severity level for a parse diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// A non-fatal issue that doesn't prevent parsing.
    Warning,
    /// A recoverable error; the tree is still produced in recovery mode.
    Error,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Source location within an XML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (in characters, not bytes).
    pub column: u32,
    /// 0-based byte offset from the start of the input.
    pub byte_offset: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A diagnostic recorded while parsing in recovery mode.
#[derive(Debug, Clone)]
pub struct ParseDiagnostic {
    pub severity: ErrorSeverity,
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} at {}", self.severity, self.message, self.location)
    }
}

/// The error type returned when XML parsing fails.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// The primary error message.
    pub message: String,
    /// Where in the source the fatal error occurred.
    pub location: SourceLocation,
    /// Diagnostics collected before the fatal error.
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at {}: {}", self.location, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Errors surfaced by the file-level helpers in [`crate::file`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input file could not be read.
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output could not be written.
    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input bytes could not be decoded to UTF-8.
    #[error("{}: {source}", path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: EncodingError,
    },

    /// The input is not well-formed XML.
    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation {
            line: 10,
            column: 5,
            byte_offset: 42,
        };
        assert_eq!(loc.to_string(), "10:5");
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError {
            message: "mismatched end tag".to_string(),
            location: SourceLocation {
                line: 3,
                column: 7,
                byte_offset: 30,
            },
            diagnostics: vec![],
        };
        assert_eq!(err.to_string(), "parse error at 3:7: mismatched end tag");
    }

    #[test]
    fn test_parse_diagnostic_display() {
        let diag = ParseDiagnostic {
            severity: ErrorSeverity::Error,
            message: "duplicate attribute: 'id'".to_string(),
            location: SourceLocation {
                line: 1,
                column: 12,
                byte_offset: 11,
            },
        };
        assert_eq!(diag.to_string(), "error: duplicate attribute: 'id' at 1:12");
    }

    #[test]
    fn test_error_wraps_parse_error_with_path() {
        let err = Error::Parse {
            path: PathBuf::from("config.xml"),
            source: ParseError {
                message: "missing root element".to_string(),
                location: SourceLocation::default(),
                diagnostics: vec![],
            },
        };
        assert_eq!(
            err.to_string(),
            "config.xml: parse error at 0:0: missing root element"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
