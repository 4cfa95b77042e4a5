use thiserror::Error;

use crate::location::Location;

/// Every failure mode the execution core can raise, plus the two front-end
/// kinds (`Lex`, `Parse`) that belong to the external lexer/parser
/// collaborators rather than the evaluator itself. Keeping them in the same
/// enum is a pragmatic concession to having a single `Result` alias for the
/// whole crate; tests of the evaluator's own error taxonomy never construct
/// or match on `Lex`/`Parse`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{loc}: pattern did not match value")]
    Match { loc: Location },

    #[error("{loc}: undefined variable '{name}'")]
    UndefinedVariable { name: String, loc: Location },

    #[error("{loc}: {op} is not supported for {left} and {right}")]
    UnsupportedOperation {
        op: String,
        left: String,
        right: String,
        loc: Location,
    },

    #[error("{loc}: division by zero")]
    DivisionByZero { loc: Location },

    #[error("{loc}: '{name}' is not a callable function")]
    CallTarget { name: String, loc: Location },

    #[error("{loc}: expected {expected} argument(s), got {got}")]
    Arity {
        expected: usize,
        got: usize,
        loc: Location,
    },

    #[error("cannot pop the root scope")]
    ScopeUnderflow,

    #[error("{loc}: unsupported node: {kind}")]
    UnsupportedNode { kind: String, loc: Location },

    #[error("{loc}: {message}")]
    Runtime { message: String, loc: Location },

    #[error("lex error: {0}")]
    Lex(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    /// The source location associated with this error, when it has one.
    /// `ScopeUnderflow`, `Lex`, and `Parse` are not tied to a specific AST
    /// node (the first is an internal invariant, the latter two predate the
    /// AST existing at all).
    pub fn location(&self) -> Option<&Location> {
        match self {
            Error::Match { loc }
            | Error::UndefinedVariable { loc, .. }
            | Error::UnsupportedOperation { loc, .. }
            | Error::DivisionByZero { loc }
            | Error::CallTarget { loc, .. }
            | Error::Arity { loc, .. }
            | Error::UnsupportedNode { loc, .. }
            | Error::Runtime { loc, .. } => Some(loc),
            Error::ScopeUnderflow | Error::Lex(_) | Error::Parse(_) => None,
        }
    }

    /// A short, stable tag for the error kind, independent of the formatted
    /// message. Used by [`crate::diagnostics::Diagnostic`].
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Match { .. } => "MatchError",
            Error::UndefinedVariable { .. } => "UndefinedVariable",
            Error::UnsupportedOperation { .. } => "UnsupportedOperation",
            Error::DivisionByZero { .. } => "DivisionByZero",
            Error::CallTarget { .. } => "CallTargetError",
            Error::Arity { .. } => "ArityError",
            Error::ScopeUnderflow => "ScopeUnderflow",
            Error::UnsupportedNode { .. } => "UnsupportedNode",
            Error::Runtime { .. } => "RuntimeError",
            Error::Lex(_) => "LexError",
            Error::Parse(_) => "ParseError",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
