//! Error types for zxml

use std::fmt;
use thiserror::Error;

/// Position in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.offset, self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub const fn at(pos: Pos) -> Self {
        Self::new(pos, pos)
    }

    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input is not well-formed XML
    Malformed,
    UnexpectedEof,
    MismatchedTag { expected: String, found: String },
    /// A document type declaration was present
    ForbiddenDtd,
    UndefinedEntity { entity: String },
    InvalidEncoding { encoding: String },
    UnsupportedEncoding { encoding: String },
    MaxDepthExceeded { max: u16 },
    MaxSizeExceeded { max: usize },
    /// Strict decoding found repeated tags among distinct siblings
    AmbiguousSiblings { tag: String },
    Io,
    /// A mapping key cannot be used as an element name
    InvalidTagName { name: String },
    /// Text holds a character that XML 1.0 cannot represent
    UnrepresentableChar { code: u32 },
}

impl ErrorKind {
    /// True for every kind that can come out of decoding
    pub const fn is_parse(&self) -> bool {
        !matches!(
            self,
            Self::InvalidTagName { .. } | Self::UnrepresentableChar { .. }
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed xml"),
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::MismatchedTag { expected, found } => {
                write!(f, "mismatched closing tag: expected </{expected}>, found </{found}>")
            }
            Self::ForbiddenDtd => write!(f, "document type declarations are forbidden"),
            Self::UndefinedEntity { entity } => write!(f, "undefined entity: &{entity};"),
            Self::InvalidEncoding { encoding } => {
                write!(f, "input is not valid {encoding}")
            }
            Self::UnsupportedEncoding { encoding } => {
                write!(f, "unsupported encoding: {encoding}")
            }
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
            Self::AmbiguousSiblings { tag } => {
                write!(f, "ambiguous siblings: <{tag}> repeats among distinct tags")
            }
            Self::Io => write!(f, "i/o error"),
            Self::InvalidTagName { name } => write!(f, "invalid tag name: {name:?}"),
            Self::UnrepresentableChar { code } => {
                write!(f, "character U+{code:04X} cannot appear in xml")
            }
        }
    }
}

/// Main error type for zxml
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this error was raised while decoding input
    pub fn is_parse_error(&self) -> bool {
        self.kind.is_parse()
    }

    /// Create error at specific position
    pub fn at(kind: ErrorKind, pos: Pos) -> Self {
        Self::new(kind, Span::at(pos))
    }

    pub(crate) fn unrepresentable_char(ch: char) -> Self {
        Self::new(
            ErrorKind::UnrepresentableChar {
                code: u32::from(ch),
            },
            Span::empty(),
        )
    }

    pub(crate) fn invalid_tag_name(name: &str) -> Self {
        Self::new(
            ErrorKind::InvalidTagName {
                name: name.to_string(),
            },
            Span::empty(),
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.kind.is_parse() {
            write!(f, "XML render error - {}", self.message)
        } else if self.span == Span::empty() {
            write!(f, "XML parse error - {}", self.message)
        } else {
            write!(
                f,
                "XML parse error - error at {}: {}",
                self.span.start, self.message
            )
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::with_message(ErrorKind::Io, Span::empty(), err.to_string())
    }
}

/// Result type alias for zxml
pub type Result<T> = std::result::Result<T, Error>;
