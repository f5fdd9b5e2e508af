//! Node and attribute payloads.

use std::borrow::Cow;

/// The kind of an XML node and its associated data.
///
/// Navigation links (parent, children, siblings) live in `NodeData`, not
/// here, so reordering siblings never touches a node's payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document node. There is exactly one per `Document`.
    Document,

    /// An element node, e.g. `<svg:rect width="4">`.
    Element {
        /// The local part of the tag name.
        name: String,
        /// Namespace prefix (`"svg"` in `svg:rect`), if any.
        prefix: Option<String>,
        /// Attributes in document order. Sorting rewrites this order.
        attributes: Vec<Attribute>,
    },

    /// Character data with references already resolved.
    Text { content: String },

    /// A CDATA section, stored without its delimiters.
    CData { content: String },

    /// A comment, stored without `<!--` and `-->`.
    Comment { content: String },

    /// A processing instruction, e.g. `<?xml-stylesheet href="a.css"?>`.
    ProcessingInstruction {
        target: String,
        data: Option<String>,
    },

    /// A document type declaration, kept so it survives a round trip.
    DocumentType {
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
        /// The internal subset text between `[` and `]`, verbatim.
        internal_subset: Option<String>,
    },
}

impl NodeKind {
    /// Creates an element payload from a possibly prefixed tag name.
    #[must_use]
    pub fn element(qname: &str, attributes: Vec<Attribute>) -> Self {
        let (prefix, name) = split_qname(qname);
        Self::Element {
            name: name.to_string(),
            prefix: prefix.map(str::to_string),
            attributes,
        }
    }

    /// Creates a text payload.
    #[must_use]
    pub fn text(content: &str) -> Self {
        Self::Text {
            content: content.to_string(),
        }
    }

    /// Returns `true` for element nodes.
    #[must_use]
    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element { .. })
    }
}

/// An attribute on an element.
///
/// Namespace declarations (`xmlns`, `xmlns:p`) are ordinary attributes here
/// and are sorted like any other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The local part of the attribute name.
    pub name: String,
    /// Namespace prefix (`"xml"` in `xml:lang`), if any.
    pub prefix: Option<String>,
    /// The attribute value with references resolved.
    pub value: String,
}

impl Attribute {
    /// Creates an attribute from a possibly prefixed name.
    ///
    /// ```
    /// use sortxml::Attribute;
    ///
    /// let attr = Attribute::new("xml:lang", "en");
    /// assert_eq!(attr.prefix.as_deref(), Some("xml"));
    /// assert_eq!(attr.name, "lang");
    /// assert_eq!(attr.qualified_name(), "xml:lang");
    /// ```
    #[must_use]
    pub fn new(qname: &str, value: &str) -> Self {
        let (prefix, name) = split_qname(qname);
        Self {
            name: name.to_string(),
            prefix: prefix.map(str::to_string),
            value: value.to_string(),
        }
    }

    /// Returns the name as written in the document (`prefix:name`).
    #[must_use]
    pub fn qualified_name(&self) -> Cow<'_, str> {
        qualified_name(self.prefix.as_deref(), &self.name)
    }
}

/// Joins an optional prefix and a local name, borrowing when unprefixed.
pub(crate) fn qualified_name<'a>(prefix: Option<&str>, name: &'a str) -> Cow<'a, str> {
    match prefix {
        Some(p) => Cow::Owned(format!("{p}:{name}")),
        None => Cow::Borrowed(name),
    }
}

/// Splits `"p:name"` into `(Some("p"), "name")` and `"name"` into
/// `(None, "name")`.
pub(crate) fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => {
            (Some(prefix), local)
        }
        _ => (None, qname),
    }
}
