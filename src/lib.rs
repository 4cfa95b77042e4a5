//! A tree-walking evaluator for a small dynamic, object-flavored
//! scripting language.
//!
//! The crate is split the way the language's own execution model is
//! split: a [`value`] model, a [`scope`] stack, a [`function_table`],
//! an [`stack`] operand stack, a single [`ast`]-dispatching [`eval`]
//! visitor, and a [`matcher`] for the `=:` destructuring operator. The
//! [`lexer`] and [`parser`] are external collaborators in the sense that
//! the evaluator only ever consumes the [`ast::Node`] tree they produce;
//! [`interpreter::Interpreter`] is the facade that wires all of it
//! together for a host.
//!
//! ```
//! use myst::Interpreter;
//!
//! let mut interp = Interpreter::new();
//! let result = interp.run("a =: 1\na + 1", "<example>").unwrap();
//! assert_eq!(result.to_string(), "2");
//! ```

pub mod ast;
pub mod diagnostics;
pub mod error;
pub mod eval;
pub mod function_table;
pub mod interpreter;
pub mod kernel;
pub mod lexer;
pub mod location;
pub mod matcher;
pub mod parser;
pub mod scope;
pub mod stack;
pub mod token;
pub mod value;

pub use diagnostics::{Diagnostic, ErrorSink, StderrSink, VecSink};
pub use error::{Error, Result};
pub use interpreter::{Config, Interpreter, InterpreterBuilder};
pub use value::Value;
