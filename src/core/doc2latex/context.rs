//! Generation state for one serialization pass.
//!
//! All mutable state of a pass lives in one explicit context value so
//! that independent passes never interfere: the output stream with its
//! row tracker, the switch state machine, the macro tables, and the
//! accumulated diagnostics.

use doctex_doc::DocumentGraph;

use super::stream::LatexStream;
use super::switches::SwitchState;
use crate::core::macros::MacroNest;
use crate::data::{encoding_or_default, language_or_default, Encoding, Language};
use crate::preamble_hints::PreambleHints;
use crate::utils::error::{RenderWarning, UncodableChar};

/// Options for a generation pass
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Preview mode: substitute a visible placeholder for uncodable
    /// characters instead of collecting them as diagnostics.
    /// Default: false
    pub dry_run: bool,

    /// Consult the process-wide macro table as the last resolution step.
    /// Default: true
    pub allow_global_macros: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            allow_global_macros: true,
        }
    }
}

impl RenderOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a preview pass with visible placeholders
    pub fn preview() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }
}

/// Mutable state threaded through the recursive walk of one pass.
pub struct GenerationContext<'a> {
    pub(crate) graph: &'a DocumentGraph,
    pub(crate) options: &'a RenderOptions,
    /// Key of the document being serialized.
    pub(crate) doc_key: &'a str,
    pub(crate) stream: LatexStream,
    pub(crate) switches: SwitchState,
    pub(crate) macros: MacroNest,
    pub(crate) hints: PreambleHints,
    pub(crate) uncodable: Vec<UncodableChar>,
    pub(crate) warnings: Vec<RenderWarning>,
    /// Language last selected in the stream.
    pub(crate) current_lang: &'static Language,
    pub(crate) default_lang: &'static Language,
    pub(crate) default_encoding: &'static Encoding,
    pub(crate) global_encoding_switch: bool,
}

impl<'a> GenerationContext<'a> {
    pub(crate) fn new(graph: &'a DocumentGraph, options: &'a RenderOptions) -> Self {
        let (default_lang, default_encoding, global_encoding_switch) = graph
            .root_document()
            .map(|doc| {
                (
                    language_or_default(&doc.settings.language),
                    encoding_or_default(&doc.settings.encoding),
                    doc.settings.global_encoding_switch,
                )
            })
            .unwrap_or((
                language_or_default(""),
                encoding_or_default(""),
                false,
            ));
        Self {
            graph,
            options,
            doc_key: graph.root.as_str(),
            stream: LatexStream::new(),
            switches: SwitchState::new(),
            macros: MacroNest::new(),
            hints: PreambleHints::new(),
            uncodable: Vec::new(),
            warnings: Vec::new(),
            current_lang: default_lang,
            default_lang,
            default_encoding,
            global_encoding_switch,
        }
    }

    /// Encoding currently governing plain characters.
    pub(crate) fn active_encoding(&self) -> &'static Encoding {
        self.switches
            .current_encoding()
            .unwrap_or(self.default_encoding)
    }
}
