//! Utility modules
//!
//! - Error and result types for generation
//! - Compiler-log diagnostics routed back to document positions

pub mod diagnostics;
pub mod error;

// Re-export commonly used items
pub use diagnostics::{format_diagnostics, parse_log, route_log, Diagnostic, DiagnosticLevel};
pub use error::{RenderError, RenderResult, RenderWarning, UncodableChar};
