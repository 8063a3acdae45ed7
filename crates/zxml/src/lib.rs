//! zxml - XML codec for generic value trees
//!
//! Decodes XML documents into [`Value`] trees (mappings, sequences, text
//! scalars and nulls) and renders value trees back into XML, either as a
//! plain document or wrapped in a SOAP envelope.
//!
//! # Quick Start
//!
//! ```
//! use zxml::{from_xml_str, to_xml_string, Value};
//! # fn main() -> Result<(), zxml::Error> {
//! let value = from_xml_str("<root><name>John</name><tags><list-item>a</list-item></tags></root>")?;
//! let name = value
//!     .as_mapping()
//!     .and_then(|map| map.get("name"))
//!     .and_then(Value::as_text)
//!     .unwrap_or_default();
//! assert_eq!(name, "John");
//!
//! let xml = to_xml_string(&value)?;
//! assert_eq!(
//!     xml,
//!     "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
//!      <root><name>John</name><tags><list-item>a</list-item></tags></root>"
//! );
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod input;
pub use input::{DEFAULT_ENCODING, Encoding, Input};

pub mod value;
pub use value::{LazyText, Mapping, Scalar, Sequence, Value};

pub mod xml;
pub use xml::{Document as XmlDocument, Element as XmlElement, Parser as XmlParser, XmlWriter};

pub mod decode;
pub use decode::{DEFAULT_ITEM_TAG, Decoder, DecoderConfig, from_xml_bytes, from_xml_reader, from_xml_str};

pub mod encode;
pub use encode::{DEFAULT_ROOT_TAG, RendererConfig, XmlRenderer, to_xml_string};

pub mod soap;
pub use soap::{SoapRenderer, SoapSchema, to_soap_string};

pub mod typed;
pub use typed::type_convert;

#[cfg(feature = "serde")]
mod serde_impl;

/// Convert an already parsed XML document with default settings
pub fn from_xml_document(document: &XmlDocument) -> Result<Value> {
    Decoder::new().decode_document(document)
}
