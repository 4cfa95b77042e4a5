use crate::error::Error;
use crate::location::Location;

/// A captured error formatted for the error sink (§6.3, §7): location,
/// kind, and message, kept separately rather than as one opaque string
/// so a host can filter or group by `kind` without re-parsing text.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: &'static str,
    pub message: String,
    pub location: Option<Location>,
}

impl From<&Error> for Diagnostic {
    fn from(err: &Error) -> Self {
        Diagnostic {
            kind: err.kind(),
            message: err.to_string(),
            location: err.location().cloned(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{}: [{}] {}", loc, self.kind, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Where captured diagnostics go when `Config::capture_errors` is set
/// (§6.3). `VecSink` is the in-memory default; a host can implement this
/// to forward diagnostics anywhere else (a log, a UI panel, a test
/// harness's assertion list).
pub trait ErrorSink {
    fn record(&mut self, diagnostic: Diagnostic);
}

#[derive(Debug, Default)]
pub struct VecSink {
    diagnostics: Vec<Diagnostic>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl ErrorSink for VecSink {
    fn record(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Writes each diagnostic straight to stderr instead of collecting it.
/// The default a host reaches for when it wants `capture_errors` behavior
/// without keeping its own `Vec<Diagnostic>` around — e.g. the CLI binary,
/// which already prints diagnostics itself but can hand this to
/// `Interpreter` directly instead.
#[derive(Debug, Default)]
pub struct StderrSink;

impl StderrSink {
    pub fn new() -> Self {
        Self
    }
}

impl ErrorSink for StderrSink {
    fn record(&mut self, diagnostic: Diagnostic) {
        eprintln!("{}", diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::location::Location;

    #[test]
    fn vec_sink_collects_in_order() {
        let mut sink = VecSink::new();
        assert!(sink.is_empty());
        sink.record(Diagnostic::from(&Error::ScopeUnderflow));
        sink.record(Diagnostic::from(&Error::DivisionByZero {
            loc: Location::internal(),
        }));
        assert_eq!(sink.diagnostics().len(), 2);
        assert_eq!(sink.diagnostics()[0].kind, "ScopeUnderflow");
        assert_eq!(sink.diagnostics()[1].kind, "DivisionByZero");
    }

    #[test]
    fn stderr_sink_implements_error_sink() {
        let mut sink = StderrSink::new();
        sink.record(Diagnostic::from(&Error::ScopeUnderflow));
    }
}
