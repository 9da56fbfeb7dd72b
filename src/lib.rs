//! Doctex - document tree to LaTeX serialization
//!
//! Doctex converts an in-memory hierarchical document (paragraphs,
//! nested insets, user-defined macros) into a LaTeX text stream while
//! recording an exact correspondence between generated lines and
//! document positions:
//!
//! - a recursive serializer that groups same-style paragraph runs into
//!   one environment pair and keeps encoding packages and language
//!   spans correctly nested,
//! - position-scoped macro resolution across child-document inclusion,
//!   safe against inclusion cycles,
//! - a row tracker answering line↔position queries, used to route
//!   compiler diagnostics back to exact document locations.
//!
//! ```
//! use doctex::{render_document, RenderOptions};
//! use doctex::doc::{Document, DocumentGraph, Paragraph};
//!
//! let doc = Document::new(vec![Paragraph::text(1, "Hello, world.")]);
//! let graph = DocumentGraph::single("main", doc);
//! let output = render_document(&graph, &RenderOptions::default()).unwrap();
//! assert!(output.content.contains("Hello, world."));
//! ```

pub mod core;
pub mod data;
pub mod preamble_hints;
pub mod utils;

/// The document model crate, re-exported.
pub use doctex_doc as doc;

// Re-export the main API surface
pub use crate::core::doc2latex::{render_document, RenderOptions, RenderOutput};
pub use crate::core::macros::{define_global_macro, MacroData, MacroNest};
pub use crate::core::rowmap::{MathEntry, RowEntry, RowTracker, TextEntry};
pub use crate::preamble_hints::PreambleHints;
pub use crate::utils::diagnostics::{
    format_diagnostics, parse_log, route_log, Diagnostic, DiagnosticLevel,
};
pub use crate::utils::error::{RenderError, RenderResult, RenderWarning, UncodableChar};

/// Serialize a single document without building a graph by hand.
pub fn render_single(document: doc::Document, options: &RenderOptions) -> RenderResult<RenderOutput> {
    let graph = doc::DocumentGraph::single("main", document);
    render_document(&graph, options)
}
