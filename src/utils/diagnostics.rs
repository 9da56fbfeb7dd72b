//! Compiler-log diagnostics routed back into the document.
//!
//! A LaTeX run reports positions as 1-based lines of the generated
//! source. Parsing the log and mapping those lines through the row
//! tracker turns them into paragraph positions a caller can act on.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::core::rowmap::{RowTracker, TextEntry};

/// Severity of a routed diagnostic (determines coloring).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    /// 1-based line of the generated source, when the log names one.
    pub line: Option<usize>,
    /// Document position the line maps back to.
    pub entry: Option<TextEntry>,
}

impl Diagnostic {
    fn new(level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            line: None,
            entry: None,
        }
    }

    /// ANSI color code for this diagnostic's severity.
    pub fn color_code(&self) -> &'static str {
        match self.level {
            DiagnosticLevel::Error => "\x1b[31m",   // red
            DiagnosticLevel::Warning => "\x1b[33m", // yellow
            DiagnosticLevel::Info => "\x1b[36m",    // cyan
        }
    }
}

lazy_static! {
    static ref ERROR_LINE: Regex = Regex::new(r"^! (.+)$").unwrap();
    static ref SOURCE_LINE: Regex = Regex::new(r"^l\.(\d+)").unwrap();
    static ref WARNING_LINE: Regex =
        Regex::new(r"^LaTeX Warning: (.+?)(?: on input line (\d+))?\.?$").unwrap();
    static ref BAD_BOX: Regex =
        Regex::new(r"^(Overfull|Underfull) \\[hv]box .* at lines (\d+)--(\d+)").unwrap();
}

/// Parse the interesting shapes out of a LaTeX log: errors with their
/// `l.<n>` position lines, warnings, and over/underfull boxes.
pub fn parse_log(log: &str) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    for line in log.lines() {
        if let Some(captures) = ERROR_LINE.captures(line) {
            diagnostics.push(Diagnostic::new(DiagnosticLevel::Error, &captures[1]));
        } else if let Some(captures) = SOURCE_LINE.captures(line) {
            let number = captures[1].parse().ok();
            // The l.<n> line belongs to the most recent unlocated error.
            if let Some(diag) = diagnostics
                .iter_mut()
                .rev()
                .find(|diag| diag.level == DiagnosticLevel::Error && diag.line.is_none())
            {
                diag.line = number;
            }
        } else if let Some(captures) = WARNING_LINE.captures(line) {
            let mut diag = Diagnostic::new(DiagnosticLevel::Warning, &captures[1]);
            diag.line = captures.get(2).and_then(|m| m.as_str().parse().ok());
            diagnostics.push(diag);
        } else if let Some(captures) = BAD_BOX.captures(line) {
            let mut diag = Diagnostic::new(DiagnosticLevel::Info, &captures[0]);
            diag.line = captures[2].parse().ok();
            diagnostics.push(diag);
        }
    }
    diagnostics
}

/// Parse a log and map every located diagnostic back to the nearest
/// enclosing document position.
pub fn route_log(log: &str, rows: &RowTracker) -> Vec<Diagnostic> {
    let mut diagnostics = parse_log(log);
    for diag in &mut diagnostics {
        diag.entry = diag.line.and_then(|line| rows.entry_at(line));
    }
    diagnostics
}

/// Render diagnostics for terminal output.
pub fn format_diagnostics(diagnostics: &[Diagnostic], color: bool) -> String {
    let mut out = String::new();
    for diag in diagnostics {
        let label = match diag.level {
            DiagnosticLevel::Error => "error",
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Info => "info",
        };
        if color {
            out.push_str(diag.color_code());
        }
        out.push_str(&format!("[{}]", label));
        if color {
            out.push_str("\x1b[0m");
        }
        if let Some(line) = diag.line {
            out.push_str(&format!(" line {}", line));
        }
        if let Some(entry) = diag.entry {
            out.push_str(&format!(" (paragraph {}, offset {})", entry.par, entry.pos));
        }
        out.push_str(&format!(": {}\n", diag.message));
    }
    out
}
