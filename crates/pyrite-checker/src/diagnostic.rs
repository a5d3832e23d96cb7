//! Diagnostics reported by a checking run
//!
//! The checker decides that and where a problem exists; this module owns how
//! it is presented. Every diagnostic carries a stable code from
//! [`error_codes`].

pub mod error_codes;

use crate::span::Span;
use pyrite_config::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic schema version
pub const DIAG_VERSION: u32 = 1;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub diag_version: u32,
    pub level: DiagnosticLevel,
    /// Stable code, e.g. "PY3002"
    pub code: String,
    pub message: String,
    pub file: String,
    /// Source line (1-based)
    pub line: usize,
    /// Column (1-based)
    pub column: usize,
    pub length: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub help: Option<String>,
    /// Enclosing function, if the problem is inside one
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub function: Option<String>,
    /// Enclosing class, if the problem is inside one
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub class: Option<String>,
}

impl Diagnostic {
    fn with_level(
        level: DiagnosticLevel,
        code: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            diag_version: DIAG_VERSION,
            level,
            code: code.into(),
            message: message.into(),
            file: "<unknown>".to_string(),
            line: span.line,
            column: span.start + 1,
            length: span.len(),
            notes: Vec::new(),
            help: None,
            function: None,
            class: None,
        }
    }

    /// Create a new error diagnostic with code
    pub fn error_with_code(
        code: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::with_level(DiagnosticLevel::Error, code, message, span)
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attach the enclosing function and class names
    pub fn with_context(mut self, function: Option<String>, class: Option<String>) -> Self {
        self.function = function;
        self.class = class;
        self
    }

    /// Format as human-readable string
    pub fn to_human_string(&self) -> String {
        let mut output = String::new();

        if let Some(context) = self.context_line() {
            output.push_str(&format!("{}: {}\n", self.file, context));
        }

        // error[PY3002]: Incompatible types in assignment
        output.push_str(&format!("{}[{}]: {}\n", self.level, self.code, self.message));
        output.push_str(&format!("  --> {}:{}:{}\n", self.file, self.line, self.column));

        for note in &self.notes {
            output.push_str(&format!("   = note: {}\n", note));
        }
        if let Some(help) = &self.help {
            output.push_str(&format!("   = help: {}\n", help));
        }

        output
    }

    /// `In member "m" of class "C"` style header line
    fn context_line(&self) -> Option<String> {
        match (&self.function, &self.class) {
            (Some(func), Some(class)) => {
                Some(format!("In member \"{}\" of class \"{}\"", func, class))
            }
            (Some(func), None) => Some(format!("In function \"{}\"", func)),
            (None, Some(class)) => Some(format!("In class \"{}\"", class)),
            (None, None) => None,
        }
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Render a run's diagnostics in the configured output format.
///
/// Human output concatenates the individual reports; JSON output is a
/// single pretty-printed array.
pub fn render_diagnostics(
    diagnostics: &[Diagnostic],
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Human => Ok(diagnostics
            .iter()
            .map(Diagnostic::to_human_string)
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => serde_json::to_string_pretty(diagnostics),
    }
}
