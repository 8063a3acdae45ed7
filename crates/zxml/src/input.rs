//! Byte input and character decoding

use std::borrow::Cow;
use std::io::Read;

use crate::error::{Error, ErrorKind, Result, Span};

/// Encoding used when the caller does not name one
pub const DEFAULT_ENCODING: &str = "utf-8";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Character encodings the decoder accepts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Ascii,
    Latin1,
}

impl Encoding {
    /// Resolve an encoding label, case-insensitively
    pub fn from_label(label: &str) -> Result<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "us-ascii" | "ascii" => Ok(Self::Ascii),
            "iso-8859-1" | "iso8859-1" | "latin-1" | "latin1" => Ok(Self::Latin1),
            _ => Err(Error::new(
                ErrorKind::UnsupportedEncoding {
                    encoding: label.to_string(),
                },
                Span::empty(),
            )),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Ascii => "us-ascii",
            Self::Latin1 => "iso-8859-1",
        }
    }
}

/// Raw document bytes paired with the encoding to read them in
#[derive(Clone, Debug)]
pub struct Input<'a> {
    source: Cow<'a, [u8]>,
    encoding: Encoding,
}

impl<'a> Input<'a> {
    /// Create from byte slice
    pub const fn from_bytes(source: &'a [u8]) -> Self {
        Self {
            source: Cow::Borrowed(source),
            encoding: Encoding::Utf8,
        }
    }

    /// Create from string
    pub const fn from_str(source: &'a str) -> Self {
        Self::from_bytes(source.as_bytes())
    }

    /// Set the encoding the bytes are in
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub const fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Get source bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.source
    }

    /// Get length in bytes
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Decode the bytes into text
    pub fn decode(&self) -> Result<Cow<'_, str>> {
        let bytes: &[u8] = &self.source;
        match self.encoding {
            Encoding::Utf8 => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                std::str::from_utf8(bytes)
                    .map(Cow::Borrowed)
                    .map_err(|_| self.invalid())
            }
            Encoding::Ascii => {
                if bytes.is_ascii() {
                    std::str::from_utf8(bytes)
                        .map(Cow::Borrowed)
                        .map_err(|_| self.invalid())
                } else {
                    Err(self.invalid())
                }
            }
            Encoding::Latin1 => Ok(Cow::Owned(bytes.iter().copied().map(char::from).collect())),
        }
    }

    fn invalid(&self) -> Error {
        Error::new(
            ErrorKind::InvalidEncoding {
                encoding: self.encoding.label().to_string(),
            },
            Span::empty(),
        )
    }
}

impl Input<'static> {
    /// Drain a reader into an owned input
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(Self {
            source: Cow::Owned(buffer),
            encoding: Encoding::Utf8,
        })
    }
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(s: &'a str) -> Self {
        Self::from_str(s)
    }
}

impl<'a> From<&'a [u8]> for Input<'a> {
    fn from(b: &'a [u8]) -> Self {
        Self::from_bytes(b)
    }
}
