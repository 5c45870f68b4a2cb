//! Source locations carried from the parse tree into diagnostics.
//!
//! The elaboration core never reads source text itself (see §5/§6 of the
//! design): every [`Span`] it touches is copied from a token the parser
//! collaborator already attached a `(file, line, column)` triple to.

use std::fmt;
use std::rc::Rc;

/// A source location, copied from the parse tree the caller handed us.
///
/// `line`/`column` are 1-based, matching the convention used by the parser
/// collaborator's AST JSON (§6).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub file: Option<Rc<str>>,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(file: Option<Rc<str>>, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }

    /// A span with no known source location, for synthesized nodes
    /// (e.g. reserved fields) that have no parse-tree counterpart.
    pub fn synthetic() -> Self {
        Self { file: None, line: 0, column: 0 }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.file.as_deref().unwrap_or("<unknown>");
        write!(f, "{path}:{}:{}", self.line, self.column)
    }
}
