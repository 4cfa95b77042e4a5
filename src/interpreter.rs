use crate::ast::Node;
use crate::diagnostics::{Diagnostic, ErrorSink, VecSink};
use crate::error::Result;
use crate::eval::Evaluator;
use crate::parser::Parser;
use crate::value::Value;
use std::rc::Rc;

/// Tunables that don't belong in the evaluator itself. `max_call_depth`
/// is this crate's own addition — the core spec has no recursion limit,
/// but a host embedding an interpreter for untrusted scripts needs one,
/// and every function call already goes through a single chokepoint
/// (`Evaluator::call`) that can cheaply check it.
#[derive(Debug, Clone)]
pub struct Config {
    pub max_call_depth: usize,
    pub capture_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_call_depth: 512,
            capture_errors: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct InterpreterBuilder {
    config: Config,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.config.max_call_depth = depth;
        self
    }

    pub fn capture_errors(mut self, capture: bool) -> Self {
        self.config.capture_errors = capture;
        self
    }

    pub fn build(self) -> Interpreter {
        Interpreter::with_config(self.config)
    }
}

/// The facade a host program drives: parse source, run it, read back
/// captured diagnostics (§6.3). Mirrors the teacher's sandbox-facade
/// shape — a thin wrapper gluing the parser to the evaluator — but
/// without the tool-registration API, since this language has no
/// native-function-registration concept of its own.
pub struct Interpreter {
    evaluator: Evaluator,
    config: Config,
    sink: VecSink,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            evaluator: Evaluator::new(config.max_call_depth),
            config,
            sink: VecSink::new(),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.sink.diagnostics()
    }

    /// Parses and runs `source` (§6.3's `run(program, capture_errors)`).
    /// When `capture_errors` is configured, a failure is recorded to the
    /// sink and `Ok(Value::Nil)` is returned instead of propagating —
    /// mirroring the teacher's top-level `execute` returning a `Result`
    /// that a caller may or may not choose to unwrap.
    pub fn run(&mut self, source: &str, file: &str) -> Result<Value> {
        let outcome = self.try_run(source, file);
        self.finish(outcome)
    }

    /// Runs an already-parsed tree directly, for callers that built or
    /// cached their own `Node` (e.g. a host that parses once and
    /// re-evaluates, or reuses a tree across several `Interpreter`s).
    /// Shares `run`'s `capture_errors` policy and logging.
    pub fn run_ast(&mut self, program: &Rc<Node>) -> Result<Value> {
        let outcome = self.evaluator.run(program);
        self.finish(outcome)
    }

    fn finish(&mut self, outcome: Result<Value>) -> Result<Value> {
        match outcome {
            Ok(value) => Ok(value),
            Err(err) if self.config.capture_errors => {
                tracing::warn!(error = %err, "interpreter run failed");
                self.sink.record(Diagnostic::from(&err));
                Ok(Value::Nil)
            }
            Err(err) => Err(err),
        }
    }

    fn try_run(&mut self, source: &str, file: &str) -> Result<Value> {
        let program = Parser::parse_program(source, file)?;
        tracing::debug!(file, "parsed program");
        self.evaluator.run(&program)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
