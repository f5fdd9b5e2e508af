//! XML serialization.
//!
//! Turns a `Document` tree back into XML text, either compact or indented.

pub mod xml;

pub use xml::{serialize, serialize_with_options, SerializeOptions};
