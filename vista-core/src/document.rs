//! Ownership of the parse tree for a single decode.

use core::fmt::{self, Display};
use core::str::FromStr;

use serde_json::Value;

use crate::{JsonView, Policy};

/// A parsed JSON document.
///
/// The document owns the node tree produced by `serde_json`. Every
/// [`JsonView`] handed out borrows from it, so the borrow checker guarantees
/// that no view outlives the document it points into.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Parse a document from UTF-8 bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, DocumentError> {
        let root = serde_json::from_slice(bytes)?;
        Ok(Self { root })
    }

    /// Parse a document from text.
    pub fn parse_str(text: &str) -> Result<Self, DocumentError> {
        Self::parse(text.as_bytes())
    }

    /// Parse a document from UTF-16 code units.
    ///
    /// Unpaired surrogates are reported as [`DocumentErrorKind::InvalidEncoding`].
    pub fn parse_utf16(units: &[u16]) -> Result<Self, DocumentError> {
        let text = String::from_utf16(units)
            .map_err(|_| DocumentError::without_position(DocumentErrorKind::InvalidEncoding))?;
        Self::parse_str(&text)
    }

    /// Wrap an already-built `serde_json` tree.
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// A view over the root node, using `policy` for coercions.
    pub fn root<'a>(&'a self, policy: &'a Policy) -> JsonView<'a> {
        JsonView::new(Some(&self.root), policy)
    }

    /// A view over the root node, using [`Policy::STANDARD`].
    pub fn view(&self) -> JsonView<'_> {
        self.root(Policy::standard())
    }

    /// The underlying node tree.
    pub fn value(&self) -> &Value {
        &self.root
    }
}

impl FromStr for Document {
    type Err = DocumentError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse_str(text)
    }
}

/// Error returned when bytes or text cannot be turned into a [`Document`].
///
/// The decode entry points never surface this: a failed parse decodes from a
/// null view instead. It is only returned by the explicit `Document::parse*`
/// constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentError {
    /// What went wrong
    pub kind: DocumentErrorKind,
    /// 1-based line of the failure, when known
    pub line: Option<usize>,
    /// 1-based column of the failure, when known
    pub column: Option<usize>,
}

/// Specific kinds of document errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentErrorKind {
    /// The input is not well-formed JSON
    Syntax,
    /// The input ended in the middle of a value
    UnexpectedEof,
    /// The input text could not be converted to UTF-8
    InvalidEncoding,
    /// Any other failure reported by the parser (nesting limit, I/O)
    Other,
}

impl DocumentError {
    /// Create an error that carries no source position.
    pub const fn without_position(kind: DocumentErrorKind) -> Self {
        DocumentError {
            kind,
            line: None,
            column: None,
        }
    }
}

impl Display for DocumentErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentErrorKind::Syntax => write!(f, "invalid JSON syntax"),
            DocumentErrorKind::UnexpectedEof => write!(f, "unexpected end of input"),
            DocumentErrorKind::InvalidEncoding => write!(f, "input is not valid UTF-16"),
            DocumentErrorKind::Other => write!(f, "JSON parser error"),
        }
    }
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => {
                write!(f, "{} at line {line} column {column}", self.kind)
            }
            _ => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for DocumentError {}

impl From<serde_json::Error> for DocumentError {
    fn from(error: serde_json::Error) -> Self {
        use serde_json::error::Category;

        let kind = match error.classify() {
            Category::Syntax => DocumentErrorKind::Syntax,
            Category::Eof => DocumentErrorKind::UnexpectedEof,
            Category::Io | Category::Data => DocumentErrorKind::Other,
        };
        // serde_json reports line 0 when it has no position
        let known = error.line() > 0;
        DocumentError {
            kind,
            line: known.then(|| error.line()),
            column: known.then(|| error.column()),
        }
    }
}
