//! Streaming XML writer
//!
//! Emits start/end tag and character events straight into a text buffer.
//! Element names are validated on the way in; text and attribute values are
//! escaped. Characters outside the XML `Char` production have no escaped
//! form and fail the write.

use crate::error::{Error, Result};
use crate::xml::is_xml_char;

/// Declaration written by [`XmlWriter::start_document`]
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// Event-driven XML serializer
#[derive(Debug, Default)]
pub struct XmlWriter {
    out: String,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
        }
    }

    pub fn start_document(&mut self) {
        self.out.push_str(XML_DECLARATION);
    }

    pub fn start_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.open_tag(name, attrs)?;
        self.out.push('>');
        Ok(())
    }

    /// Write a self-closing `<name/>` element
    pub fn empty_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.open_tag(name, attrs)?;
        self.out.push_str("/>");
        Ok(())
    }

    pub fn characters(&mut self, text: &str) -> Result<()> {
        escape_text_into(text, &mut self.out)
    }

    pub fn end_element(&mut self, name: &str) {
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    /// Finish the document and hand back the serialized text
    pub fn end_document(self) -> String {
        self.out
    }

    fn open_tag(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        if !is_valid_name(name) {
            return Err(Error::invalid_tag_name(name));
        }
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs {
            if !is_valid_name(key) {
                return Err(Error::invalid_tag_name(key));
            }
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            escape_attr_into(value, &mut self.out)?;
            self.out.push('"');
        }
        Ok(())
    }
}

/// Whether `name` can be used verbatim as an element or attribute name
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_' || first == ':') {
        return false;
    }
    chars.all(is_name_char)
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | ':' | '-' | '.')
}

fn escape_text_into(text: &str, out: &mut String) -> Result<()> {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ if !is_xml_char(ch) => return Err(Error::unrepresentable_char(ch)),
            _ => out.push(ch),
        }
    }
    Ok(())
}

fn escape_attr_into(text: &str, out: &mut String) -> Result<()> {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ if !is_xml_char(ch) => return Err(Error::unrepresentable_char(ch)),
            _ => out.push(ch),
        }
    }
    Ok(())
}
