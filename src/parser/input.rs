//! Byte cursor and lexical primitives shared by the XML parser.
//!
//! [`ParserInput`] owns the position (byte offset, line, column), the
//! nesting depth and name length limits, and the diagnostics collected in
//! recovery mode. The free functions at the bottom read the self-delimited
//! constructs (comments, CDATA, processing instructions, the XML
//! declaration) that appear both in the prolog and in element content.
//!
//! Only the five predefined entities and character references are
//! resolved. Entities declared in a DTD are never expanded and nothing is
//! ever loaded from outside the input.

use crate::error::{ErrorSeverity, ParseDiagnostic, ParseError, SourceLocation};

/// Default maximum element nesting depth.
pub(crate) const DEFAULT_MAX_DEPTH: u32 = 256;

/// Default maximum length in bytes of an element or attribute name.
pub(crate) const DEFAULT_MAX_NAME_LENGTH: usize = 50_000;

// -------------------------------------------------------------------------
// Character classes (XML 1.0 §2.2, §2.3)
// -------------------------------------------------------------------------

/// `Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]`
pub(crate) fn is_xml_char(c: char) -> bool {
    matches!(c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x0001_0000..=0x0010_FFFF
    )
}

/// `NameStartChar`, with `:` allowed so prefixed names read as one token.
pub(crate) fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}'
    )
}

pub(crate) fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
        )
}

fn is_whitespace_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

// -------------------------------------------------------------------------
// Cursor
// -------------------------------------------------------------------------

/// Position-tracking cursor over UTF-8 input.
pub(crate) struct ParserInput<'a> {
    input: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
    depth: u32,
    max_depth: u32,
    max_name_length: usize,
    recover: bool,
    pub(crate) diagnostics: Vec<ParseDiagnostic>,
}

impl<'a> ParserInput<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            recover: false,
            diagnostics: Vec::new(),
        }
    }

    pub fn set_max_depth(&mut self, max: u32) {
        self.max_depth = max;
    }

    pub fn set_max_name_length(&mut self, max: usize) {
        self.max_name_length = max;
    }

    pub fn set_recover(&mut self, recover: bool) {
        self.recover = recover;
    }

    pub fn recover(&self) -> bool {
        self.recover
    }

    // -- Depth tracking --

    pub fn increment_depth(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.fatal(format!(
                "maximum nesting depth exceeded ({})",
                self.max_depth
            )));
        }
        Ok(())
    }

    pub fn decrement_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // -- Position --

    pub fn location(&self) -> SourceLocation {
        SourceLocation {
            line: self.line,
            column: self.column,
            byte_offset: self.pos,
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the input between two byte offsets as a string slice.
    pub fn slice_str(&self, start: usize, end: usize) -> Result<&'a str, ParseError> {
        let input = self.input;
        std::str::from_utf8(&input[start..end]).map_err(|_| self.fatal("invalid UTF-8"))
    }

    // -- Peeking --

    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    pub fn peek_char(&self) -> Option<char> {
        let rest = self.input.get(self.pos..)?;
        // A char is at most four bytes; decode only that much.
        let head = &rest[..rest.len().min(4)];
        match std::str::from_utf8(head) {
            Ok(s) => s.chars().next(),
            Err(e) => std::str::from_utf8(&head[..e.valid_up_to()])
                .ok()
                .and_then(|s| s.chars().next()),
        }
    }

    pub fn looking_at(&self, s: &[u8]) -> bool {
        self.input[self.pos.min(self.input.len())..].starts_with(s)
    }

    // -- Advancing --

    /// Advances `count` bytes. Only call this over ASCII.
    pub fn advance(&mut self, count: usize) {
        for _ in 0..count {
            let Some(&b) = self.input.get(self.pos) else {
                return;
            };
            self.bump_line(b == b'\n');
            self.pos += 1;
        }
    }

    fn advance_char(&mut self, ch: char) {
        self.bump_line(ch == '\n');
        self.pos += ch.len_utf8();
    }

    fn bump_line(&mut self, newline: bool) {
        if newline {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    pub fn next_byte(&mut self) -> Result<u8, ParseError> {
        let b = self
            .peek()
            .ok_or_else(|| self.fatal("unexpected end of input"))?;
        self.advance(1);
        Ok(b)
    }

    /// Consumes one character. `\r\n` and lone `\r` both come back as `\n`.
    pub fn next_char(&mut self) -> Result<char, ParseError> {
        let ch = self
            .peek_char()
            .ok_or_else(|| self.fatal("unexpected end of input"))?;
        self.advance_char(ch);
        if ch == '\r' {
            if self.peek() == Some(b'\n') {
                self.advance(1);
            }
            return Ok('\n');
        }
        if !is_xml_char(ch) {
            let message = format!("invalid XML character: U+{:04X}", ch as u32);
            if !self.recover {
                return Err(self.fatal(message));
            }
            self.push_diagnostic(ErrorSeverity::Error, message);
        }
        Ok(ch)
    }

    pub fn expect_byte(&mut self, expected: u8) -> Result<(), ParseError> {
        match self.peek() {
            Some(b) if b == expected => {
                self.advance(1);
                Ok(())
            }
            Some(b) => Err(self.fatal(format!(
                "expected '{}', found '{}'",
                expected as char,
                self.peek_char().unwrap_or(b as char)
            ))),
            None => Err(self.fatal(format!(
                "expected '{}', found end of input",
                expected as char
            ))),
        }
    }

    pub fn expect_str(&mut self, expected: &[u8]) -> Result<(), ParseError> {
        expected.iter().try_for_each(|&b| self.expect_byte(b))
    }

    /// Skips whitespace. Returns `true` if any was consumed.
    pub fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(is_whitespace_byte) {
            self.advance(1);
        }
        self.pos > start
    }

    pub fn skip_whitespace_required(&mut self) -> Result<(), ParseError> {
        if self.skip_whitespace() {
            Ok(())
        } else {
            Err(self.fatal("whitespace required"))
        }
    }

    /// Consumes ASCII bytes while `pred` holds.
    pub fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii() && pred(b)) {
            self.advance(1);
        }
        let input = self.input;
        // ASCII only, so always valid UTF-8.
        std::str::from_utf8(&input[start..self.pos]).unwrap_or_default()
    }

    // -- Tokens --

    /// Reads a `Name` (prefixed names included).
    pub fn parse_name(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        match self.peek_char() {
            Some(c) if is_name_start_char(c) => self.advance_char(c),
            Some(c) => return Err(self.fatal(format!("invalid name start character: '{c}'"))),
            None => return Err(self.fatal("expected name, found end of input")),
        }
        while let Some(c) = self.peek_char().filter(|&c| is_name_char(c)) {
            self.advance_char(c);
        }
        let len = self.pos - start;
        if len > self.max_name_length {
            return Err(self.fatal(format!(
                "name length ({len}) exceeds maximum ({})",
                self.max_name_length
            )));
        }
        Ok(self.slice_str(start, self.pos)?.to_string())
    }

    /// Reads `&name;`, `&#N;` or `&#xH;` and returns the replacement text.
    ///
    /// An unknown entity is an error; in recovery mode it is recorded as a
    /// warning and replaced with nothing.
    pub fn parse_reference(&mut self) -> Result<String, ParseError> {
        self.expect_byte(b'&')?;
        if self.peek() == Some(b'#') {
            self.advance(1);
            let (digits, radix) = if self.peek() == Some(b'x') {
                self.advance(1);
                (self.take_while(|b| b.is_ascii_hexdigit()), 16)
            } else {
                (self.take_while(|b| b.is_ascii_digit()), 10)
            };
            if digits.is_empty() {
                return Err(self.fatal("empty character reference"));
            }
            let value = u32::from_str_radix(digits, radix)
                .map_err(|_| self.fatal("character reference out of range"))?;
            self.expect_byte(b';')?;
            return match char::from_u32(value).filter(|&c| is_xml_char(c)) {
                Some(c) => Ok(c.to_string()),
                None => Err(self.fatal(format!(
                    "character reference &#x{value:X}; is not a valid XML character"
                ))),
            };
        }

        let name = self.parse_name()?;
        self.expect_byte(b';')?;
        let text = match name.as_str() {
            "amp" => "&",
            "lt" => "<",
            "gt" => ">",
            "apos" => "'",
            "quot" => "\"",
            _ => {
                let message = format!("unknown entity reference: &{name};");
                if !self.recover {
                    return Err(self.fatal(message));
                }
                self.push_diagnostic(ErrorSeverity::Warning, message);
                ""
            }
        };
        Ok(text.to_string())
    }

    /// Reads a quoted attribute value, resolving references and turning
    /// literal tabs and newlines into spaces (XML 1.0 §3.3.3).
    pub fn parse_attribute_value(&mut self) -> Result<String, ParseError> {
        let quote = self.next_byte()?;
        if quote != b'"' && quote != b'\'' {
            return Err(self.fatal("attribute value must be quoted"));
        }
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(self.fatal("unexpected end of input in attribute value")),
                Some(b) if b == quote => {
                    self.advance(1);
                    return Ok(value);
                }
                Some(b'&') => value.push_str(&self.parse_reference()?),
                Some(b'<') => return Err(self.fatal("'<' not allowed in attribute values")),
                Some(_) => match self.next_char()? {
                    '\n' | '\t' => value.push(' '),
                    ch => value.push(ch),
                },
            }
        }
    }

    /// Reads a quoted literal verbatim.
    pub fn parse_quoted_value(&mut self) -> Result<String, ParseError> {
        let quote = self.next_byte()?;
        if quote != b'"' && quote != b'\'' {
            return Err(self.fatal("expected quoted value"));
        }
        let start = self.pos;
        while self.peek().is_some_and(|b| b != quote) {
            self.advance(1);
        }
        let value = self.slice_str(start, self.pos)?.to_string();
        self.expect_byte(quote)?;
        Ok(value)
    }

    // -- Errors --

    pub fn fatal(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            location: self.location(),
            diagnostics: self.diagnostics.clone(),
        }
    }

    pub fn push_diagnostic(&mut self, severity: ErrorSeverity, message: String) {
        self.diagnostics.push(ParseDiagnostic {
            severity,
            message,
            location: self.location(),
        });
    }
}

// -------------------------------------------------------------------------
// Delimited constructs
// -------------------------------------------------------------------------

/// Reads `<!-- ... -->` and returns the text between the delimiters.
pub(crate) fn parse_comment_content(input: &mut ParserInput<'_>) -> Result<String, ParseError> {
    input.expect_str(b"<!--")?;
    let mut content = String::new();
    loop {
        if input.at_end() {
            return Err(input.fatal("unexpected end of input in comment"));
        }
        if input.looking_at(b"-->") {
            input.advance(3);
            return Ok(content);
        }
        if input.looking_at(b"--") {
            if !input.recover() {
                return Err(input.fatal("'--' not allowed inside comments"));
            }
            input.push_diagnostic(
                ErrorSeverity::Error,
                "'--' not allowed inside comments".to_string(),
            );
            content.push_str("--");
            input.advance(2);
            continue;
        }
        content.push(input.next_char()?);
    }
}

/// Reads `<![CDATA[ ... ]]>` and returns the section text.
pub(crate) fn parse_cdata_content(input: &mut ParserInput<'_>) -> Result<String, ParseError> {
    input.expect_str(b"<![CDATA[")?;
    let mut content = String::new();
    loop {
        if input.at_end() {
            return Err(input.fatal("unexpected end of input in CDATA section"));
        }
        if input.looking_at(b"]]>") {
            input.advance(3);
            return Ok(content);
        }
        content.push(input.next_char()?);
    }
}

/// Reads `<?target data?>`.
pub(crate) fn parse_pi_content(
    input: &mut ParserInput<'_>,
) -> Result<(String, Option<String>), ParseError> {
    input.expect_str(b"<?")?;
    let target = input.parse_name()?;
    if target.eq_ignore_ascii_case("xml") {
        return Err(input.fatal("PI target 'xml' is reserved"));
    }
    if !input.skip_whitespace() {
        input.expect_str(b"?>")?;
        return Ok((target, None));
    }
    let mut data = String::new();
    loop {
        if input.at_end() {
            return Err(input.fatal("unexpected end of input in processing instruction"));
        }
        if input.looking_at(b"?>") {
            input.advance(2);
            break;
        }
        data.push(input.next_char()?);
    }
    Ok((target, (!data.is_empty()).then_some(data)))
}

/// The pseudo-attributes of `<?xml ...?>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
}

/// Reads the XML declaration. The caller has checked for `<?xml`.
pub(crate) fn parse_xml_decl(input: &mut ParserInput<'_>) -> Result<XmlDeclaration, ParseError> {
    input.expect_str(b"<?xml")?;
    input.skip_whitespace_required()?;

    let version = parse_pseudo_attribute(input, b"version")?;
    if !is_valid_version_num(&version) {
        return Err(input.fatal(format!("invalid version number: '{version}'")));
    }

    let mut separated = input.skip_whitespace();
    let mut encoding = None;
    if input.looking_at(b"encoding") {
        if !separated {
            return Err(input.fatal("whitespace required before encoding"));
        }
        let label = parse_pseudo_attribute(input, b"encoding")?;
        if !is_valid_encoding_name(&label) {
            return Err(input.fatal(format!("invalid encoding name: '{label}'")));
        }
        encoding = Some(label);
        separated = input.skip_whitespace();
    }

    let mut standalone = None;
    if input.looking_at(b"standalone") {
        if !separated {
            return Err(input.fatal("whitespace required before standalone"));
        }
        standalone = match parse_pseudo_attribute(input, b"standalone")?.as_str() {
            "yes" => Some(true),
            "no" => Some(false),
            _ => return Err(input.fatal("standalone must be 'yes' or 'no'")),
        };
        input.skip_whitespace();
    }

    input.expect_str(b"?>")?;
    Ok(XmlDeclaration {
        version,
        encoding,
        standalone,
    })
}

fn parse_pseudo_attribute(input: &mut ParserInput<'_>, name: &[u8]) -> Result<String, ParseError> {
    input.expect_str(name)?;
    input.skip_whitespace();
    input.expect_byte(b'=')?;
    input.skip_whitespace();
    input.parse_quoted_value()
}

/// `VersionNum ::= '1.' [0-9]+`
fn is_valid_version_num(s: &str) -> bool {
    s.strip_prefix("1.")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// `EncName ::= [A-Za-z] ([A-Za-z0-9._] | '-')*`
fn is_valid_encoding_name(s: &str) -> bool {
    let mut bytes = s.bytes();
    bytes.next().is_some_and(|b| b.is_ascii_alphabetic())
        && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}
