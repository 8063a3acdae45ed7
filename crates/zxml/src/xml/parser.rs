//! Hardened XML parser
//!
//! Builds an element tree from a document. The parser is deliberately
//! narrow: document type declarations are rejected outright, so no internal
//! or external entity can ever be defined or expanded. Only the five
//! predefined entities and numeric character references are recognised.
//! Comments and processing instructions are skipped, attributes are checked
//! for well-formedness and dropped, CDATA sections become text.

use std::collections::HashSet;

use crate::error::{Error, ErrorKind, Pos, Result, Span};
use crate::xml::cursor::Cursor;
use crate::xml::is_xml_char;
use crate::xml::model::{Content, Document, Element};

/// Nesting depth never exceeded, whatever the configured limit.
///
/// Parsing and tree conversion recurse once per level, so this bounds
/// stack use.
pub const DEPTH_CEILING: u16 = 512;

/// Limits applied while parsing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth, capped at [`DEPTH_CEILING`]
    /// (0 means the ceiling itself)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_size: 10 * 1024 * 1024, // 10 MB default
        }
    }
}

impl Config {
    /// Create a new config with unlimited size and the deepest allowed nesting
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }

    /// Depth limit actually enforced
    pub const fn effective_max_depth(&self) -> u16 {
        if self.max_depth == 0 || self.max_depth > DEPTH_CEILING {
            DEPTH_CEILING
        } else {
            self.max_depth
        }
    }
}

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: Config,
    depth: u16,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    pub fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
            depth: 0,
        }
    }

    /// Parse a complete document
    pub fn parse(&mut self) -> Result<Document> {
        let size = self.cursor.remaining().len();
        if self.config.max_size > 0 && size > self.config.max_size {
            return Err(Error::new(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                Span::empty(),
            ));
        }

        self.skip_misc()?;
        if self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::UnexpectedEof, "no root element"));
        }
        let root = self.parse_element()?;
        self.skip_misc()?;

        if !self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::Malformed, "junk after document element"));
        }

        Ok(Document { root })
    }

    /// Skip whitespace, comments and processing instructions around the root
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.starts_with(b"<?") {
                self.skip_processing_instruction()?;
            } else if self.cursor.starts_with(b"<!--") {
                self.skip_comment()?;
            } else if self.cursor.starts_with(b"<!") {
                return Err(self.markup_declaration_error());
            } else {
                return Ok(());
            }
        }
    }

    fn parse_element(&mut self) -> Result<Element> {
        self.expect_byte(b'<')?;
        self.enter()?;

        let name = self.parse_name()?;
        self.skip_attributes()?;

        let mut element = Element::new(name);
        if self.cursor.eat(b"/>") {
            self.depth -= 1;
            return Ok(element);
        }
        self.expect_byte(b'>')?;

        loop {
            if self.cursor.is_eof() {
                return Err(self.error_here(
                    ErrorKind::UnexpectedEof,
                    format!("unclosed element <{}>", element.name),
                ));
            }

            if self.cursor.starts_with(b"</") {
                self.parse_closing_tag(&element.name)?;
                break;
            }

            if self.cursor.starts_with(b"<!--") {
                self.skip_comment()?;
            } else if self.cursor.starts_with(b"<![CDATA[") {
                let text = self.parse_cdata()?;
                element.children.push(Content::Text(text));
            } else if self.cursor.starts_with(b"<!") {
                return Err(self.markup_declaration_error());
            } else if self.cursor.starts_with(b"<?") {
                self.skip_processing_instruction()?;
            } else if self.cursor.current() == Some(b'<') {
                let child = self.parse_element()?;
                element.children.push(Content::Element(child));
            } else {
                let text = self.parse_text()?;
                element.children.push(Content::Text(text));
            }
        }

        self.depth -= 1;
        Ok(element)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth = self.depth.saturating_add(1);
        let max = self.config.effective_max_depth();
        if self.depth > max {
            return Err(Error::at(
                ErrorKind::MaxDepthExceeded { max },
                self.cursor.position(),
            ));
        }
        Ok(())
    }

    fn parse_closing_tag(&mut self, open: &str) -> Result<()> {
        let start = self.cursor.position();
        self.cursor.advance_by(2);
        let close = self.parse_name()?;
        if close != open {
            return Err(Error::at(
                ErrorKind::MismatchedTag {
                    expected: open.to_string(),
                    found: close,
                },
                start,
            ));
        }
        self.cursor.skip_whitespace();
        self.expect_byte(b'>')
    }

    /// Attributes are outside the value model; check their syntax only
    fn skip_attributes(&mut self) -> Result<()> {
        let mut seen = HashSet::new();

        loop {
            let had_space = matches!(
                self.cursor.current(),
                Some(b' ' | b'\t' | b'\r' | b'\n')
            );
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/' | b'>') => return Ok(()),
                Some(_) if !had_space => {
                    return Err(self.error_here(ErrorKind::Malformed, "expected whitespace"));
                }
                Some(_) => {}
                None => {
                    return Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated tag"));
                }
            }

            let start = self.cursor.position();
            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            self.parse_attribute_value()?;

            if !seen.insert(name) {
                return Err(Error::with_message(
                    ErrorKind::Malformed,
                    Span::at(start),
                    "duplicate attribute",
                ));
            }
        }
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => {
                return Err(self.error_here(ErrorKind::Malformed, "expected quoted attribute value"));
            }
        };
        self.cursor.advance();

        let start = self.cursor.position();
        let begin = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = bytes_to_str(self.cursor.slice_from(begin), start)?;
                self.cursor.advance();
                check_chars(raw, start)?;
                return decode_entities(raw, start);
            }
            if b == b'<' {
                return Err(self.error_here(ErrorKind::Malformed, "'<' in attribute value"));
            }
            self.cursor.advance();
        }

        Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated attribute value"))
    }

    fn parse_text(&mut self) -> Result<String> {
        let start = self.cursor.position();
        let begin = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let raw = bytes_to_str(self.cursor.slice_from(begin), start)?;
        check_chars(raw, start)?;
        if raw.contains("]]>") {
            return Err(Error::with_message(
                ErrorKind::Malformed,
                Span::at(start),
                "']]>' in character data",
            ));
        }
        decode_entities(raw, start)
    }

    fn parse_cdata(&mut self) -> Result<String> {
        let start = self.cursor.position();
        self.cursor.advance_by(b"<![CDATA[".len());
        match self.cursor.take_until(b"]]>") {
            Some(raw) => {
                let text = bytes_to_str(raw, start)?;
                check_chars(text, start)?;
                Ok(text.to_string())
            }
            None => Err(Error::with_message(
                ErrorKind::UnexpectedEof,
                Span::at(start),
                "unterminated CDATA section",
            )),
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.cursor.position();
        let begin = self.cursor.pos();

        match self.cursor.current() {
            Some(first) if is_name_start(first) => self.cursor.advance(),
            Some(_) => return Err(self.error_here(ErrorKind::Malformed, "invalid name")),
            None => return Err(self.error_here(ErrorKind::UnexpectedEof, "expected name")),
        }
        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        bytes_to_str(self.cursor.slice_from(begin), start).map(str::to_string)
    }

    fn skip_comment(&mut self) -> Result<()> {
        let start = self.cursor.position();
        self.cursor.advance_by(b"<!--".len());
        match self.cursor.take_until(b"-->") {
            Some(_) => Ok(()),
            None => Err(Error::with_message(
                ErrorKind::UnexpectedEof,
                Span::at(start),
                "unterminated comment",
            )),
        }
    }

    fn skip_processing_instruction(&mut self) -> Result<()> {
        let start = self.cursor.position();
        self.cursor.advance_by(2);
        match self.cursor.take_until(b"?>") {
            Some(_) => Ok(()),
            None => Err(Error::with_message(
                ErrorKind::UnexpectedEof,
                Span::at(start),
                "unterminated processing instruction",
            )),
        }
    }

    fn markup_declaration_error(&self) -> Error {
        if self.cursor.starts_with(b"<!DOCTYPE") || self.cursor.starts_with(b"<!ENTITY") {
            Error::at(ErrorKind::ForbiddenDtd, self.cursor.position())
        } else {
            self.error_here(ErrorKind::Malformed, "unexpected markup declaration")
        }
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        match self.cursor.current() {
            Some(b) if b == expected => {
                self.cursor.advance();
                Ok(())
            }
            Some(_) => Err(self.error_here(
                ErrorKind::Malformed,
                format!("expected '{}'", char::from(expected)),
            )),
            None => Err(self.error_here(ErrorKind::UnexpectedEof, "unexpected end of input")),
        }
    }

    fn error_here(&self, kind: ErrorKind, message: impl Into<String>) -> Error {
        Error::with_message(kind, Span::at(self.cursor.position()), message)
    }
}

fn bytes_to_str(bytes: &[u8], start: Pos) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|_| {
        Error::with_message(
            ErrorKind::InvalidEncoding {
                encoding: "utf-8".to_string(),
            },
            Span::at(start),
            "invalid utf-8",
        )
    })
}

fn check_chars(text: &str, start: Pos) -> Result<()> {
    match text.chars().find(|&ch| !is_xml_char(ch)) {
        Some(ch) => Err(Error::with_message(
            ErrorKind::Malformed,
            Span::at(start),
            format!("invalid character U+{:04X}", u32::from(ch)),
        )),
        None => Ok(()),
    }
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_entities(input: &str, start: Pos) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        let (before, after) = rest.split_at(amp);
        result.push_str(before);

        let Some(end) = after.find(';') else {
            return Err(Error::with_message(
                ErrorKind::Malformed,
                Span::at(start),
                "unterminated entity reference",
            ));
        };
        let entity = after.get(1..end).unwrap_or_default();

        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_entity(entity),
        };

        match decoded {
            Some(ch) => result.push(ch),
            None if entity.starts_with('#') => {
                return Err(Error::with_message(
                    ErrorKind::Malformed,
                    Span::at(start),
                    format!("invalid character reference &{entity};"),
                ));
            }
            None => {
                return Err(Error::at(
                    ErrorKind::UndefinedEntity {
                        entity: entity.to_string(),
                    },
                    start,
                ));
            }
        }
        rest = after.get(end + 1..).unwrap_or_default();
    }
    result.push_str(rest);

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse::<u32>().ok()?
    };
    char::from_u32(code).filter(|&ch| is_xml_char(ch))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Document> {
        Parser::new(input.as_bytes()).parse()
    }

    fn first_child(element: &Element) -> Option<&Element> {
        element.elements().next()
    }

    #[test]
    fn test_parse_simple_element() -> Result<()> {
        let doc = parse("<root></root>")?;
        assert_eq!(doc.root.name, "root");
        assert!(doc.root.children.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_with_declaration_and_comments() -> Result<()> {
        let doc = parse(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!-- head --><root><!-- x --><a>1</a></root>\n<!-- tail -->",
        )?;
        assert_eq!(doc.root.name, "root");
        assert_eq!(doc.root.elements().count(), 1);
        Ok(())
    }

    #[test]
    fn test_attributes_are_dropped() -> Result<()> {
        let doc = parse("<root id=\"1\" name='test'><a x=\"&amp;\"/></root>")?;
        assert_eq!(doc.root.elements().count(), 1);
        Ok(())
    }

    #[test]
    fn test_parse_nested_text() -> Result<()> {
        let doc = parse("<root><child>a &amp; b &#x41;&#66;</child></root>")?;
        let child = first_child(&doc.root);
        assert_eq!(child.map(|c| c.name.as_str()), Some("child"));
        assert_eq!(child.and_then(Element::text).as_deref(), Some("a & b AB"));
        Ok(())
    }

    #[test]
    fn test_parse_self_closing() -> Result<()> {
        let doc = parse("<root><child /></root>")?;
        let child = first_child(&doc.root);
        assert_eq!(child.map(Element::is_leaf), Some(true));
        assert_eq!(child.and_then(Element::text), None);
        Ok(())
    }

    #[test]
    fn test_cdata_becomes_text() -> Result<()> {
        let doc = parse("<root><![CDATA[<b>&raw</b>]]></root>")?;
        assert_eq!(doc.root.text().as_deref(), Some("<b>&raw</b>"));
        Ok(())
    }

    #[test]
    fn test_doctype_is_forbidden() {
        let err = parse("<!DOCTYPE root [<!ENTITY x \"y\">]><root>&x;</root>").err();
        assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::ForbiddenDtd));
    }

    #[test]
    fn test_undefined_entity() {
        let err = parse("<root>&xxe;</root>").err();
        assert_eq!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::UndefinedEntity {
                entity: "xxe".to_string()
            })
        );
    }

    #[test]
    fn test_non_xml_characters_are_rejected() {
        for input in [
            "<root>\u{1}</root>",
            "<root>&#0;</root>",
            "<root>&#x1B;</root>",
            "<root a=\"\u{8}\"/>",
            "<root><![CDATA[\u{0}]]></root>",
        ] {
            let err = parse(input).err();
            assert_eq!(
                err.map(|e| e.kind().clone()),
                Some(ErrorKind::Malformed),
                "{input:?}"
            );
        }
    }

    #[test]
    fn test_cdata_end_in_text_is_rejected() {
        let err = parse("<root>x]]>y</root>").err();
        assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::Malformed));
        assert!(parse("<root>x]]&gt;y</root>").is_ok());
    }

    #[test]
    fn test_mismatched_tag() {
        let err = parse("<root><a></b></root>").err();
        assert!(matches!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::MismatchedTag { .. })
        ));
    }

    #[test]
    fn test_unterminated_element() {
        let err = parse("<root><a>").err();
        assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_junk_after_root() {
        assert!(parse("<root/><other/>").is_err());
        assert!(parse("<root/>text").is_err());
    }

    #[test]
    fn test_empty_input() {
        let err = parse("  ").err();
        assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_duplicate_attribute() {
        assert!(parse("<root a=\"1\" a=\"2\"/>").is_err());
    }

    #[test]
    fn test_max_depth() {
        let input = "<a><a><a><a></a></a></a></a>";
        let mut parser = Parser::with_config(input.as_bytes(), Config::new(3, 0));
        let err = parser.parse().err();
        assert_eq!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::MaxDepthExceeded { max: 3 })
        );

        let mut parser = Parser::with_config(input.as_bytes(), Config::new(4, 0));
        assert!(parser.parse().is_ok());
    }

    #[test]
    fn test_unlimited_depth_stops_at_ceiling() {
        let depth = usize::from(DEPTH_CEILING) + 1;
        let input = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
        for config in [Config::unlimited(), Config::new(u16::MAX, 0)] {
            let err = Parser::with_config(input.as_bytes(), config).parse().err();
            assert_eq!(
                err.map(|e| e.kind().clone()),
                Some(ErrorKind::MaxDepthExceeded { max: DEPTH_CEILING })
            );
        }

        let depth = usize::from(DEPTH_CEILING);
        let input = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
        assert!(Parser::with_config(input.as_bytes(), Config::unlimited()).parse().is_ok());
    }

    #[test]
    fn test_max_size() {
        let mut parser = Parser::with_config(b"<root>0123456789</root>", Config::new(0, 8));
        let err = parser.parse().err();
        assert_eq!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::MaxSizeExceeded { max: 8 })
        );
    }
}
