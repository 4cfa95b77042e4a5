use std::fmt;
use std::rc::Rc;

/// Where a token or AST node came from in the original source text.
///
/// Every token produced by the lexer and every node produced by the parser
/// carries one of these, and every error kind in [`crate::error::Error`]
/// carries one too, so a host embedding the interpreter can point a user at
/// the offending line without re-deriving it from the AST.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: Rc<str>,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(file: Rc<str>, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }

    /// Placeholder location for errors raised by internal invariants rather
    /// than by evaluating a specific source node (e.g. [`crate::error::Error::ScopeUnderflow`]).
    pub fn internal() -> Self {
        Self {
            file: Rc::from("<internal>"),
            line: 0,
            column: 0,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
