//! XML document to value tree
//!
//! The root element is unwrapped: decoding `<root><a>1</a></root>` yields
//! `{"a": "1"}`. Leaves decode to their raw text (or null when empty). The
//! children of an internal element become a sequence when they all share one
//! tag and that tag is the list item tag or occurs at least twice; otherwise
//! they become a mapping in which the last element with a given tag wins.
//!
//! A consequence of that rule: a mapping whose only key is the list item tag
//! renders to the same markup as a one-item sequence and decodes back as the
//! sequence.

use std::io::Read;

use tracing::{debug, instrument, warn};

use crate::error::{Error, ErrorKind, Result, Span};
use crate::input::{DEFAULT_ENCODING, Encoding, Input};
use crate::value::{Mapping, Sequence, Value};
use crate::xml::model::{Document, Element};
use crate::xml::parser::{Config as ParserConfig, Parser};

/// Tag that marks sequence items, shared with the XML renderer
pub const DEFAULT_ITEM_TAG: &str = "list-item";

/// Configuration for the decoder
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum element nesting depth, capped at
    /// [`DEPTH_CEILING`](crate::xml::parser::DEPTH_CEILING)
    /// (0 means the ceiling itself)
    pub max_depth: u16,
    /// Maximum input size in bytes, before transcoding (0 means unlimited)
    pub max_size: usize,
    /// Children carrying this tag always form a sequence, even when alone
    pub item_tag_name: String,
    /// Encoding used by [`Decoder::decode_bytes`]
    pub encoding: Encoding,
    /// Fail instead of dropping earlier siblings under the last-wins rule
    pub strict: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        let limits = ParserConfig::default();
        Self {
            max_depth: limits.max_depth,
            max_size: limits.max_size,
            item_tag_name: DEFAULT_ITEM_TAG.to_string(),
            encoding: Encoding::Utf8,
            strict: false,
        }
    }
}

impl DecoderConfig {
    pub fn with_item_tag_name(mut self, tag: impl Into<String>) -> Self {
        self.item_tag_name = tag.into();
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_limits(mut self, max_depth: u16, max_size: usize) -> Self {
        self.max_depth = max_depth;
        self.max_size = max_size;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Size is checked on the raw input, so the parser gets no size limit
    fn parser_config(&self) -> ParserConfig {
        ParserConfig::new(self.max_depth, 0)
    }

    /// Bytes to pull from a reader: one past the limit, so overruns show
    fn read_limit(&self) -> Option<u64> {
        if self.max_size == 0 {
            return None;
        }
        Some(u64::try_from(self.max_size).unwrap_or(u64::MAX).saturating_add(1))
    }
}

/// XML decoder
#[derive(Clone, Debug, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Read a whole document from `reader`, interpreting it in `encoding`
    #[instrument(level = "debug", skip(self, reader))]
    pub fn decode<R: Read>(&self, reader: R, encoding: &str) -> Result<Value> {
        let encoding = Encoding::from_label(encoding)?;
        let input = match self.config.read_limit() {
            Some(limit) => Input::from_reader(reader.take(limit))?,
            None => Input::from_reader(reader)?,
        };
        self.decode_input(&input.with_encoding(encoding))
    }

    /// Decode bytes in the configured encoding
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<Value> {
        let input = Input::from_bytes(bytes).with_encoding(self.config.encoding);
        self.decode_input(&input)
    }

    pub fn decode_str(&self, text: &str) -> Result<Value> {
        self.decode_input(&Input::from_str(text))
    }

    pub fn decode_input(&self, input: &Input<'_>) -> Result<Value> {
        debug!(
            bytes = input.len(),
            encoding = input.encoding().label(),
            "decoding xml"
        );
        let max_size = self.config.max_size;
        if max_size > 0 && input.len() > max_size {
            return Err(Error::new(
                ErrorKind::MaxSizeExceeded { max: max_size },
                Span::empty(),
            ));
        }
        let text = input.decode()?;
        let document = Parser::with_config(text.as_bytes(), self.config.parser_config()).parse()?;
        self.decode_document(&document)
    }

    /// Convert an already parsed document, dropping the root tag
    pub fn decode_document(&self, document: &Document) -> Result<Value> {
        debug!(root = %document.root.name, "converting element tree");
        self.element_value(&document.root)
    }

    fn element_value(&self, element: &Element) -> Result<Value> {
        if element.is_leaf() {
            return Ok(element.text().map_or(Value::Null, Value::text));
        }

        let children: Vec<&Element> = element.elements().collect();
        if self.is_sequence(&children) {
            let mut items = Sequence::with_capacity(children.len());
            for child in children {
                items.push(self.element_value(child)?);
            }
            return Ok(Value::Sequence(items));
        }

        let mut entries = Mapping::with_capacity(children.len());
        for child in children {
            let value = self.element_value(child)?;
            if entries.insert(child.name.as_str(), value).is_some() {
                if self.config.strict {
                    return Err(Error::new(
                        ErrorKind::AmbiguousSiblings {
                            tag: child.name.clone(),
                        },
                        Span::empty(),
                    ));
                }
                warn!(
                    parent = %element.name,
                    tag = %child.name,
                    "repeated tag among distinct siblings, keeping the last one"
                );
            }
        }
        Ok(Value::Mapping(entries))
    }

    fn is_sequence(&self, children: &[&Element]) -> bool {
        let Some(first) = children.first() else {
            return false;
        };
        let uniform = children.iter().all(|child| child.name == first.name);
        uniform && (first.name == self.config.item_tag_name || children.len() >= 2)
    }
}

/// Decode a document held in a string with default settings
pub fn from_xml_str(text: &str) -> Result<Value> {
    Decoder::new().decode_str(text)
}

/// Decode UTF-8 bytes with default settings
pub fn from_xml_bytes(bytes: &[u8]) -> Result<Value> {
    Decoder::new().decode_bytes(bytes)
}

/// Decode a document read from `reader` in the default encoding
pub fn from_xml_reader<R: Read>(reader: R) -> Result<Value> {
    Decoder::new().decode(reader, DEFAULT_ENCODING)
}
