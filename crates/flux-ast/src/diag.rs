use std::fmt::Write as _;

use serde::Serialize;

use crate::span::{SourceLocation, SourceRange};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    Note,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal error",
        }
    }
}

/// A secondary message attached to a diagnostic.
#[derive(Clone, Debug, Serialize)]
pub struct DiagNote {
    pub loc: SourceLocation,
    pub message: String,
}

/// A suggested source edit attached to a diagnostic.
#[derive(Clone, Debug, Serialize)]
pub struct FixHint {
    pub range: SourceRange,
    pub replacement: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub loc: SourceLocation,
    pub message: String,
    pub notes: Vec<DiagNote>,
    pub fixes: Vec<FixHint>,
}

impl Diagnostic {
    pub fn new(severity: Severity, loc: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            severity,
            loc,
            message: message.into(),
            notes: Vec::new(),
            fixes: Vec::new(),
        }
    }

    /// Render the diagnostic in the severity-prefixed style.
    /// `filename` is prepended to the location when available.
    pub fn render(&self, filename: Option<&str>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}: {}", self.severity.as_str(), self.message);
        if self.loc.is_valid() {
            match filename {
                Some(name) => {
                    let _ = writeln!(out, "  --> {}:{}", name, self.loc);
                }
                None => {
                    let _ = writeln!(out, "  --> {}", self.loc);
                }
            }
        }
        for note in &self.notes {
            let _ = writeln!(out, "  note: {}", note.message);
            if note.loc.is_valid() {
                let _ = writeln!(out, "    --> {}", note.loc);
            }
        }
        for fix in &self.fixes {
            let _ = writeln!(out, "  help: {}", fix.description);
            if !fix.replacement.is_empty() {
                let _ = writeln!(out, "    suggested: {}", fix.replacement);
            }
        }
        out
    }
}

pub type DiagnosticHandler = Box<dyn FnMut(&Diagnostic)>;

/// Collects severity-tagged diagnostics, tracks error/warning counts, and
/// forwards each message to a pluggable handler (stderr by default).
#[derive(Default)]
pub struct DiagnosticEngine {
    handler: Option<DiagnosticHandler>,
    diagnostics: Vec<Diagnostic>,
    error_count: u32,
    warning_count: u32,
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a custom rendering handler. The engine keeps collecting
    /// diagnostics either way.
    pub fn set_handler(&mut self, handler: DiagnosticHandler) {
        self.handler = Some(handler);
    }

    pub fn error(&mut self, loc: SourceLocation, message: impl Into<String>) {
        self.emit(Diagnostic::new(Severity::Error, loc, message));
    }

    pub fn warning(&mut self, loc: SourceLocation, message: impl Into<String>) {
        self.emit(Diagnostic::new(Severity::Warning, loc, message));
    }

    pub fn note(&mut self, loc: SourceLocation, message: impl Into<String>) {
        self.emit(Diagnostic::new(Severity::Note, loc, message));
    }

    pub fn fatal(&mut self, loc: SourceLocation, message: impl Into<String>) {
        self.emit(Diagnostic::new(Severity::Fatal, loc, message));
    }

    pub fn emit(&mut self, diag: Diagnostic) {
        match diag.severity {
            Severity::Error | Severity::Fatal => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Note => {}
        }

        match &mut self.handler {
            Some(handler) => handler(&diag),
            None => eprint!("{}", diag.render(None)),
        }

        self.diagnostics.push(diag);
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn warning_count(&self) -> u32 {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Clear all collected diagnostics and counters.
    pub fn reset(&mut self) {
        self.diagnostics.clear();
        self.error_count = 0;
        self.warning_count = 0;
    }
}
