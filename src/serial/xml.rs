//! XML serializer.
//!
//! Writes a `Document` back out as XML text. The XML declaration is written
//! only when the parsed input had one. Top-level nodes are separated by
//! newlines; the returned string carries no trailing newline.

use crate::tree::{qualified_name, Document, NodeId, NodeKind};

/// Options controlling XML serialization output.
///
/// # Examples
///
/// ```
/// use sortxml::Document;
/// use sortxml::serial::{serialize_with_options, SerializeOptions};
///
/// let doc = Document::parse_str("<root><child>Hello</child></root>").unwrap();
/// let xml = serialize_with_options(&doc, &SerializeOptions::default().indent(true));
/// assert_eq!(xml, "<root>\n  <child>Hello</child>\n</root>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Put element-only content on separate, indented lines. Defaults to
    /// `false`.
    pub indent: bool,
    /// The string written once per nesting level when `indent` is on.
    /// Defaults to two spaces.
    pub indent_str: String,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            indent: false,
            indent_str: "  ".to_string(),
        }
    }
}

impl SerializeOptions {
    /// Enables or disables indented output.
    ///
    /// Only elements whose children are elements, comments, processing
    /// instructions and whitespace are indented; whitespace text inside them
    /// is replaced by the indentation. Elements with any other text or CDATA
    /// are written exactly as they are, so mixed content never changes.
    #[must_use]
    pub fn indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn indent_str(mut self, s: &str) -> Self {
        self.indent_str = s.to_string();
        self
    }
}

/// Serializes a document without added whitespace.
///
/// ```
/// use sortxml::Document;
/// use sortxml::serial::serialize;
///
/// let doc = Document::parse_str("<r a=\"x &amp; y\">1 &lt; 2</r>").unwrap();
/// assert_eq!(serialize(&doc), "<r a=\"x &amp; y\">1 &lt; 2</r>");
/// ```
#[must_use]
pub fn serialize(doc: &Document) -> String {
    serialize_with_options(doc, &SerializeOptions::default())
}

/// Serializes a document with the given options.
#[must_use]
pub fn serialize_with_options(doc: &Document, options: &SerializeOptions) -> String {
    let mut out = String::new();

    if let Some(version) = &doc.version {
        out.push_str("<?xml version=\"");
        out.push_str(version);
        out.push('"');
        if let Some(encoding) = &doc.encoding {
            out.push_str(" encoding=\"");
            out.push_str(encoding);
            out.push('"');
        }
        if let Some(standalone) = doc.standalone {
            out.push_str(" standalone=\"");
            out.push_str(if standalone { "yes" } else { "no" });
            out.push('"');
        }
        out.push_str("?>");
    }

    let writer = Writer { doc, options };
    for child in doc.children(doc.root()) {
        if !out.is_empty() {
            out.push('\n');
        }
        writer.node(child, &mut out, 0);
    }
    out
}

struct Writer<'a> {
    doc: &'a Document,
    options: &'a SerializeOptions,
}

impl Writer<'_> {
    fn pad(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str(&self.options.indent_str);
        }
    }

    /// Whether the children of `id` may be laid out one per line.
    fn is_element_only(&self, id: NodeId) -> bool {
        let mut has_element = false;
        for child in self.doc.children(id) {
            match &self.doc.node(child).kind {
                NodeKind::Element { .. } => has_element = true,
                NodeKind::Text { content } if is_blank(content) => {}
                NodeKind::Text { .. } | NodeKind::CData { .. } => return false,
                _ => {}
            }
        }
        has_element
    }

    fn node(&self, id: NodeId, out: &mut String, depth: usize) {
        match &self.doc.node(id).kind {
            NodeKind::Element {
                name,
                prefix,
                attributes,
            } => {
                let tag = qualified_name(prefix.as_deref(), name);
                out.push('<');
                out.push_str(&tag);
                for attr in attributes {
                    out.push(' ');
                    out.push_str(&attr.qualified_name());
                    out.push_str("=\"");
                    escape_attribute(out, &attr.value);
                    out.push('"');
                }
                if self.doc.first_child(id).is_none() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                if self.options.indent && self.is_element_only(id) {
                    for child in self.doc.children(id) {
                        if matches!(&self.doc.node(child).kind, NodeKind::Text { .. }) {
                            continue;
                        }
                        out.push('\n');
                        self.pad(out, depth + 1);
                        self.node(child, out, depth + 1);
                    }
                    out.push('\n');
                    self.pad(out, depth);
                } else {
                    for child in self.doc.children(id) {
                        self.node(child, out, depth + 1);
                    }
                }
                out.push_str("</");
                out.push_str(&tag);
                out.push('>');
            }
            NodeKind::Text { content } => escape_text(out, content),
            NodeKind::CData { content } => {
                out.push_str("<![CDATA[");
                out.push_str(content);
                out.push_str("]]>");
            }
            NodeKind::Comment { content } => {
                out.push_str("<!--");
                out.push_str(content);
                out.push_str("-->");
            }
            NodeKind::ProcessingInstruction { target, data } => {
                out.push_str("<?");
                out.push_str(target);
                if let Some(data) = data {
                    out.push(' ');
                    out.push_str(data);
                }
                out.push_str("?>");
            }
            NodeKind::DocumentType {
                name,
                public_id,
                system_id,
                internal_subset,
            } => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                match (public_id, system_id) {
                    (Some(public_id), Some(system_id)) => {
                        out.push_str(" PUBLIC \"");
                        out.push_str(public_id);
                        out.push_str("\" \"");
                        out.push_str(system_id);
                        out.push('"');
                    }
                    (None, Some(system_id)) => {
                        out.push_str(" SYSTEM \"");
                        out.push_str(system_id);
                        out.push('"');
                    }
                    _ => {}
                }
                if let Some(subset) = internal_subset {
                    out.push_str(" [");
                    out.push_str(subset);
                    out.push(']');
                }
                out.push('>');
            }
            NodeKind::Document => {}
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
}

fn escape_text(out: &mut String, s: &str) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Tabs and line breaks are written as character references so that they
/// survive attribute value normalization on the next parse.
fn escape_attribute(out: &mut String, s: &str) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(ch),
        }
    }
}
