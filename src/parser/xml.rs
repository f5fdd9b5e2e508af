//! Recursive descent over the XML 1.0 grammar.
//!
//! Builds a [`Document`] directly: every construct is appended to its parent
//! as soon as it is read. Whitespace between top-level constructs is not
//! kept; whitespace inside elements is, unless `no_blanks` is set.

use crate::error::{ErrorSeverity, ParseError};
use crate::tree::{Attribute, Document, NodeId, NodeKind};

use super::input::{
    parse_cdata_content, parse_comment_content, parse_pi_content, parse_xml_decl, ParserInput,
};
use super::ParseOptions;

pub(crate) struct XmlParser<'a> {
    input: ParserInput<'a>,
    doc: Document,
    options: ParseOptions,
}

impl<'a> XmlParser<'a> {
    pub fn new(input: &'a str, options: &ParseOptions) -> Self {
        let mut cursor = ParserInput::new(input);
        cursor.set_recover(options.recover);
        cursor.set_max_depth(options.max_depth);
        cursor.set_max_name_length(options.max_name_length);
        Self {
            input: cursor,
            doc: Document::new(),
            options: options.clone(),
        }
    }

    pub fn parse(mut self) -> Result<Document, ParseError> {
        if self.looking_at_xml_decl() {
            let decl = parse_xml_decl(&mut self.input)?;
            self.doc.version = Some(decl.version);
            self.doc.encoding = decl.encoding;
            self.doc.standalone = decl.standalone;
        }

        let root = self.doc.root();
        self.parse_misc(root)?;

        if self.input.looking_at(b"<!DOCTYPE") {
            self.parse_doctype(root)?;
            self.parse_misc(root)?;
        }

        if self.input.peek() == Some(b'<')
            && self.input.peek_at(1).is_some_and(|b| b != b'!' && b != b'?')
        {
            self.parse_element(root)?;
        } else {
            self.recoverable("missing root element")?;
        }

        self.parse_misc(root)?;
        if !self.input.at_end() {
            self.recoverable("content after document element")?;
        }

        self.doc.diagnostics = std::mem::take(&mut self.input.diagnostics);
        Ok(self.doc)
    }

    /// Fails in strict mode; records an error diagnostic in recovery mode.
    fn recoverable(&mut self, message: impl Into<String>) -> Result<(), ParseError> {
        if self.options.recover {
            self.input
                .push_diagnostic(ErrorSeverity::Error, message.into());
            Ok(())
        } else {
            Err(self.input.fatal(message))
        }
    }

    fn looking_at_xml_decl(&self) -> bool {
        self.input.looking_at(b"<?xml")
            && self
                .input
                .peek_at(5)
                .is_some_and(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
    }

    // --- Prolog and epilog ---

    /// Comments, PIs and whitespace outside the document element.
    fn parse_misc(&mut self, parent: NodeId) -> Result<(), ParseError> {
        loop {
            self.input.skip_whitespace();
            if self.looking_at_xml_decl() {
                return Err(self
                    .input
                    .fatal("XML declaration allowed only at the start of the document"));
            }
            if self.input.looking_at(b"<!--") {
                self.parse_comment(parent)?;
            } else if self.input.looking_at(b"<?") {
                self.parse_processing_instruction(parent)?;
            } else {
                return Ok(());
            }
        }
    }

    /// `<!DOCTYPE name ExternalID? ('[' intSubset ']')? >`
    ///
    /// The internal subset is kept as written; its declarations are not
    /// interpreted.
    fn parse_doctype(&mut self, parent: NodeId) -> Result<(), ParseError> {
        self.input.expect_str(b"<!DOCTYPE")?;
        self.input.skip_whitespace_required()?;
        let name = self.input.parse_name()?;
        self.input.skip_whitespace();

        let mut public_id = None;
        let mut system_id = None;
        if self.input.looking_at(b"PUBLIC") {
            self.input.expect_str(b"PUBLIC")?;
            self.input.skip_whitespace_required()?;
            public_id = Some(self.input.parse_quoted_value()?);
            self.input.skip_whitespace_required()?;
            system_id = Some(self.input.parse_quoted_value()?);
        } else if self.input.looking_at(b"SYSTEM") {
            self.input.expect_str(b"SYSTEM")?;
            self.input.skip_whitespace_required()?;
            system_id = Some(self.input.parse_quoted_value()?);
        }
        self.input.skip_whitespace();

        let internal_subset = if self.input.peek() == Some(b'[') {
            self.input.advance(1);
            let start = self.input.pos();
            self.skip_internal_subset()?;
            let subset = self.input.slice_str(start, self.input.pos())?.to_string();
            self.input.expect_byte(b']')?;
            self.input.skip_whitespace();
            Some(subset)
        } else {
            None
        };
        self.input.expect_byte(b'>')?;

        let doctype = self.doc.create_node(NodeKind::DocumentType {
            name,
            public_id,
            system_id,
            internal_subset,
        });
        self.doc.append_child(parent, doctype);
        Ok(())
    }

    /// Advances to the `]` that closes the internal subset, stepping over
    /// quoted literals and comments that may contain brackets.
    fn skip_internal_subset(&mut self) -> Result<(), ParseError> {
        loop {
            match self.input.peek() {
                None => return Err(self.input.fatal("unexpected end of input in DOCTYPE")),
                Some(b']') => return Ok(()),
                Some(quote @ (b'"' | b'\'')) => {
                    self.input.advance(1);
                    while self.input.peek().is_some_and(|b| b != quote) {
                        self.input.next_char()?;
                    }
                    self.input.expect_byte(quote)?;
                }
                Some(b'<') if self.input.looking_at(b"<!--") => {
                    parse_comment_content(&mut self.input)?;
                }
                Some(_) => {
                    self.input.next_char()?;
                }
            }
        }
    }

    // --- Elements ---

    fn parse_element(&mut self, parent: NodeId) -> Result<NodeId, ParseError> {
        self.input.increment_depth()?;
        self.input.expect_byte(b'<')?;
        let name = self.input.parse_name()?;

        let mut attributes: Vec<Attribute> = Vec::new();
        loop {
            let separated = self.input.skip_whitespace();
            if self.input.peek() == Some(b'>') || self.input.looking_at(b"/>") {
                break;
            }
            if !separated {
                return Err(self.input.fatal("whitespace required between attributes"));
            }
            let attr = self.parse_attribute()?;
            if attributes
                .iter()
                .any(|a| a.name == attr.name && a.prefix == attr.prefix)
            {
                self.recoverable(format!("duplicate attribute: '{}'", attr.qualified_name()))?;
                continue;
            }
            attributes.push(attr);
        }

        let element = self.doc.create_node(NodeKind::element(&name, attributes));
        self.doc.append_child(parent, element);

        if self.input.looking_at(b"/>") {
            self.input.advance(2);
        } else {
            self.input.expect_byte(b'>')?;
            self.parse_content(element)?;
            self.parse_end_tag(&name)?;
        }

        self.input.decrement_depth();
        Ok(element)
    }

    fn parse_end_tag(&mut self, name: &str) -> Result<(), ParseError> {
        if self.input.at_end() {
            // Only reachable in recovery mode.
            return Ok(());
        }
        self.input.expect_str(b"</")?;
        let end_name = self.input.parse_name()?;
        if end_name != name {
            self.recoverable(format!(
                "mismatched end tag: expected '</{name}>', found '</{end_name}>'"
            ))?;
        }
        self.input.skip_whitespace();
        self.input.expect_byte(b'>')
    }

    fn parse_attribute(&mut self) -> Result<Attribute, ParseError> {
        let name = self.input.parse_name()?;
        self.input.skip_whitespace();
        self.input.expect_byte(b'=')?;
        self.input.skip_whitespace();
        let value = self.input.parse_attribute_value()?;
        Ok(Attribute::new(&name, &value))
    }

    // --- Content ---

    fn parse_content(&mut self, parent: NodeId) -> Result<(), ParseError> {
        loop {
            if self.input.at_end() {
                return self.recoverable("unexpected end of input in element content");
            }
            if self.input.looking_at(b"</") {
                return Ok(());
            }
            if self.input.looking_at(b"<![CDATA[") {
                let content = parse_cdata_content(&mut self.input)?;
                let node = self.doc.create_node(NodeKind::CData { content });
                self.doc.append_child(parent, node);
            } else if self.input.looking_at(b"<!--") {
                self.parse_comment(parent)?;
            } else if self.input.looking_at(b"<?") {
                self.parse_processing_instruction(parent)?;
            } else if self.input.peek() == Some(b'<') {
                self.parse_element(parent)?;
            } else {
                self.parse_char_data(parent)?;
            }
        }
    }

    /// Reads text up to the next markup, resolving references.
    fn parse_char_data(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let mut text = String::new();
        while let Some(b) = self.input.peek() {
            match b {
                b'<' => break,
                b'&' => text.push_str(&self.input.parse_reference()?),
                b']' if self.input.looking_at(b"]]>") => {
                    self.recoverable("']]>' not allowed in character data")?;
                    text.push_str("]]>");
                    self.input.advance(3);
                }
                _ => text.push(self.input.next_char()?),
            }
        }

        let blank = text.chars().all(|c| matches!(c, ' ' | '\t' | '\n'));
        if text.is_empty() || (blank && self.options.no_blanks) {
            return Ok(());
        }
        let node = self.doc.create_node(NodeKind::Text { content: text });
        self.doc.append_child(parent, node);
        Ok(())
    }

    fn parse_comment(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let content = parse_comment_content(&mut self.input)?;
        let node = self.doc.create_node(NodeKind::Comment { content });
        self.doc.append_child(parent, node);
        Ok(())
    }

    fn parse_processing_instruction(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let (target, data) = parse_pi_content(&mut self.input)?;
        let node = self
            .doc
            .create_node(NodeKind::ProcessingInstruction { target, data });
        self.doc.append_child(parent, node);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::parser::{parse_str, parse_str_with_options, ParseOptions};
    use crate::tree::{Document, NodeId, NodeKind};
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Document {
        parse_str(input).unwrap_or_else(|e| panic!("parse failed: {e}"))
    }

    fn kinds(doc: &Document, id: NodeId) -> Vec<&'static str> {
        doc.children(id)
            .map(|c| match doc.node(c).kind {
                NodeKind::Document => "document",
                NodeKind::Element { .. } => "element",
                NodeKind::Text { .. } => "text",
                NodeKind::CData { .. } => "cdata",
                NodeKind::Comment { .. } => "comment",
                NodeKind::ProcessingInstruction { .. } => "pi",
                NodeKind::DocumentType { .. } => "doctype",
            })
            .collect()
    }

    #[test]
    fn test_parse_empty_element() {
        let doc = parse("<root/>");
        let root = doc.root_element().unwrap();
        assert_eq!(doc.node_name(root).as_deref(), Some("root"));
        assert_eq!(doc.first_child(root), None);
        assert_eq!(doc.version, None);
    }

    #[test]
    fn test_parse_nested_with_attributes() {
        let doc = parse(r#"<a x="1" y='2'><b z="3">text</b></a>"#);
        let a = doc.root_element().unwrap();
        assert_eq!(doc.attribute(a, "x"), Some("1"));
        assert_eq!(doc.attribute(a, "y"), Some("2"));
        let b = doc.first_child(a).unwrap();
        assert_eq!(doc.attribute(b, "z"), Some("3"));
        assert_eq!(doc.text_content(b), "text");
    }

    #[test]
    fn test_parse_prolog_and_epilog() {
        let doc = parse(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- head -->\n<?pi data?>\n<r/>\n<!-- tail -->\n",
        );
        assert_eq!(doc.version.as_deref(), Some("1.0"));
        assert_eq!(doc.encoding.as_deref(), Some("UTF-8"));
        assert_eq!(kinds(&doc, doc.root()), vec!["comment", "pi", "element", "comment"]);
    }

    #[test]
    fn test_parse_mixed_content() {
        let doc = parse("<p>a<!--c--><![CDATA[<b>]]><?t d?><i/>z</p>");
        let p = doc.root_element().unwrap();
        assert_eq!(
            kinds(&doc, p),
            vec!["text", "comment", "cdata", "pi", "element", "text"]
        );
        assert_eq!(doc.text_content(p), "a<b>z");
    }

    #[test]
    fn test_parse_references_in_text() {
        let doc = parse("<r>&lt;&amp;&gt; &#x41;&#66;</r>");
        assert_eq!(doc.text_content(doc.root_element().unwrap()), "<&> AB");
    }

    #[test]
    fn test_parse_crlf_normalized() {
        let doc = parse("<r>a\r\nb</r>");
        assert_eq!(doc.text_content(doc.root_element().unwrap()), "a\nb");
    }

    #[test]
    fn test_parse_prefixed_names() {
        let doc = parse(r#"<x:r xmlns:x="urn:x" x:a="1"/>"#);
        let r = doc.root_element().unwrap();
        assert_eq!(doc.node_name(r).as_deref(), Some("x:r"));
        assert_eq!(doc.attribute(r, "xmlns:x"), Some("urn:x"));
        assert_eq!(doc.attribute(r, "x:a"), Some("1"));
    }

    #[test]
    fn test_whitespace_text_kept_or_dropped() {
        let xml = "<r>\n  <a/>\n  <b> </b>\n</r>";
        let kept = parse(xml);
        let r = kept.root_element().unwrap();
        assert_eq!(kinds(&kept, r), vec!["text", "element", "text", "element", "text"]);

        let dropped = parse_str_with_options(xml, &ParseOptions::default().no_blanks(true)).unwrap();
        let r = dropped.root_element().unwrap();
        assert_eq!(kinds(&dropped, r), vec!["element", "element"]);
        let b = dropped.last_child(r).unwrap();
        assert_eq!(dropped.first_child(b), None);
    }

    #[test]
    fn test_parse_doctype() {
        let doc = parse(
            "<!DOCTYPE note PUBLIC \"-//X//DTD Note//EN\" \"note.dtd\" [\n  <!ENTITY e \"]\">\n  <!-- ] -->\n]>\n<note/>",
        );
        let doctype = doc.first_child(doc.root()).unwrap();
        match &doc.node(doctype).kind {
            NodeKind::DocumentType {
                name,
                public_id,
                system_id,
                internal_subset,
            } => {
                assert_eq!(name, "note");
                assert_eq!(public_id.as_deref(), Some("-//X//DTD Note//EN"));
                assert_eq!(system_id.as_deref(), Some("note.dtd"));
                assert_eq!(
                    internal_subset.as_deref(),
                    Some("\n  <!ENTITY e \"]\">\n  <!-- ] -->\n")
                );
            }
            other => panic!("expected doctype, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_doctype_system_only() {
        let doc = parse("<!DOCTYPE r SYSTEM \"r.dtd\"><r/>");
        assert_eq!(kinds(&doc, doc.root()), vec!["doctype", "element"]);
    }

    #[test]
    fn test_well_formedness_errors() {
        for (xml, needle) in [
            ("<a></b>", "mismatched end tag"),
            ("<a x=\"1\" x=\"2\"/>", "duplicate attribute"),
            ("<!-- only -->", "missing root element"),
            ("<a/><b/>", "content after document element"),
            ("<a>&bogus;</a>", "unknown entity"),
            ("<a x=\"<\"/>", "'<' not allowed"),
            ("<a><!-- x -- y --></a>", "'--' not allowed"),
            ("<a>", "unexpected end of input"),
            ("<a x=\"1\"y=\"2\"/>", "whitespace required"),
            ("<a/>\n<?xml version=\"1.0\"?>", "XML declaration"),
        ] {
            let err = parse_str(xml).unwrap_err();
            assert!(err.message.contains(needle), "{xml}: {err}");
        }
    }

    #[test]
    fn test_error_location() {
        let err = parse_str("<a>\n  <b></c>\n</a>").unwrap_err();
        assert_eq!(err.location.line, 2);
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}{}", "<a>".repeat(20), "</a>".repeat(20));
        assert!(parse_str_with_options(&deep, &ParseOptions::default().max_depth(10)).is_err());
        assert!(parse_str_with_options(&deep, &ParseOptions::default().max_depth(20)).is_ok());
    }

    #[test]
    fn test_recover_collects_diagnostics() {
        let opts = ParseOptions::default().recover(true);
        let doc = parse_str_with_options("<a x=\"1\" x=\"2\"><b></c>&bogus;</a>", &opts).unwrap();
        assert_eq!(doc.diagnostics.len(), 3);
        let a = doc.root_element().unwrap();
        assert_eq!(doc.attributes(a).len(), 1);
    }

    #[test]
    fn test_recover_unclosed_element() {
        let opts = ParseOptions::default().recover(true);
        let doc = parse_str_with_options("<a><b>text", &opts).unwrap();
        assert_eq!(doc.text_content(doc.root_element().unwrap()), "text");
        assert!(!doc.diagnostics.is_empty());
    }
}
