//! # sortxml
//!
//! Canonical ordering for XML configuration files. Sibling elements are
//! sorted by tag name and then by their attributes, and every element's
//! attributes are sorted by name and value, with one designated attribute
//! (by default `GUID`) pinned to the front. Text, comments and processing
//! instructions stay where they were, so two files that differ only in
//! element or attribute order come out identical and diff cleanly.
//!
//! ## Quick Start
//!
//! ```
//! use sortxml::{canonicalize, serial, Document, SortOptions};
//!
//! let mut doc = Document::parse_str(
//!     r#"<config><zeta/><alpha name="b" GUID="1"/><alpha name="a"/></config>"#,
//! ).unwrap();
//! canonicalize(&mut doc, &SortOptions::default());
//! assert_eq!(
//!     serial::serialize(&doc),
//!     r#"<config><alpha GUID="1" name="b"/><alpha name="a"/><zeta/></config>"#,
//! );
//! ```

pub mod collation;
pub mod encoding;
pub mod error;
pub mod file;
pub mod parser;
pub mod serial;
pub mod sort;
pub mod tree;

// Re-export primary types at the crate root for convenience.
pub use collation::Collation;
pub use error::Error;
pub use sort::{canonicalize, SortOptions};
pub use tree::{Attribute, Document, NodeId, NodeKind};
