//! Document tree to LaTeX serialization
//!
//! The recursive walk over paragraph runs: contiguous same-style runs
//! become one environment pair, depth increases recurse, language and
//! encoding transitions go through the switch state machine, and every
//! newline is observed by the row tracker.

pub mod content;
pub mod context;
pub mod stream;
pub mod switches;

use tracing::debug;

use doctex_doc::{DocPos, Element, Inset, InsetId, LayoutKind, Paragraph, ROOT_CONTAINER};

use crate::core::rowmap::RowTracker;
use crate::data::{encoding_or_default, language_or_default, EncodingPackage, Language};
use crate::preamble_hints::PreambleHints;
use crate::utils::error::{RenderError, RenderResult, RenderWarning, UncodableChar};

pub use context::{GenerationContext, RenderOptions};

use doctex_doc::DocumentGraph;

/// Result of one generation pass.
#[derive(Debug)]
pub struct RenderOutput {
    /// The generated LaTeX body.
    pub content: String,
    /// Line↔position map, queryable after generation.
    pub rows: RowTracker,
    /// Characters dropped from the final stream (empty in dry-run mode).
    pub uncodable: Vec<UncodableChar>,
    pub warnings: Vec<RenderWarning>,
    /// Preamble requirements of the emitted body.
    pub hints: PreambleHints,
}

impl RenderOutput {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Whether every character made it into the stream.
    pub fn is_clean(&self) -> bool {
        self.uncodable.is_empty()
    }
}

/// Serialize the root document of the graph.
///
/// The pass always runs to completion: per-character and per-macro
/// anomalies are collected, never raised. The returned error cases are
/// invalid input (missing root) and internal nesting defects.
pub fn render_document(graph: &DocumentGraph, options: &RenderOptions) -> RenderResult<RenderOutput> {
    let doc = graph
        .root_document()
        .ok_or_else(|| RenderError::input(format!("root document '{}' missing", graph.root)))?;

    let mut ctx = GenerationContext::new(graph, options);
    ctx.macros.rebuild(graph);
    ctx.hints.note_language(ctx.default_lang);

    // A document-wide switch opens before the first paragraph and
    // closes after the last.
    if ctx.global_encoding_switch && ctx.default_encoding.package != EncodingPackage::None {
        ctx.switches.switch_encoding(&mut ctx.stream, ctx.default_encoding);
        ctx.hints.note_encoding(ctx.default_encoding);
    }

    ctx.render_run(
        &doc.paragraphs,
        0,
        doc.paragraphs.len(),
        ROOT_CONTAINER,
        &DocPos::default(),
        0,
    )?;

    ctx.finish()
}

impl<'a> GenerationContext<'a> {
    /// Walk a run of paragraphs at one nesting level.
    pub(crate) fn render_run(
        &mut self,
        pars: &[Paragraph],
        mut index: usize,
        end: usize,
        container: InsetId,
        prefix: &DocPos,
        base_depth: usize,
    ) -> RenderResult<usize> {
        while index < end {
            let par = &pars[index];
            if par.depth > base_depth {
                index = self.render_deeper(pars, index, end, container, prefix, base_depth)?;
            } else if par.layout.kind == LayoutKind::Environment {
                index = self.render_environment(pars, index, end, container, prefix)?;
            } else {
                self.render_paragraph(pars, index, container, prefix, false)?;
                index += 1;
            }
        }
        Ok(index)
    }

    /// One environment pair around a contiguous same-style, same-depth
    /// run (deeper paragraphs inside belong to the run).
    fn render_environment(
        &mut self,
        pars: &[Paragraph],
        start: usize,
        end: usize,
        container: InsetId,
        prefix: &DocPos,
    ) -> RenderResult<usize> {
        let layout = pars[start].layout.clone();
        let depth = pars[start].depth;
        let mut run_end = start + 1;
        while run_end < end {
            let par = &pars[run_end];
            if par.depth > depth || (par.depth == depth && par.layout.same_run(&layout)) {
                run_end += 1;
            } else {
                break;
            }
        }
        debug!(
            environment = %layout.latex_name,
            paragraphs = run_end - start,
            "environment run"
        );

        // Evaluate the language transition once at the boundary when
        // the whole run agrees on it.
        let mut suppress_lang = false;
        if let Some(lang) = self.run_language(&pars[start..run_end], depth) {
            if lang.id != self.current_lang.id && !lang.rtl && lang.has_babel() {
                self.select_language(lang);
                suppress_lang = true;
            }
        }

        self.stream.ensure_line_start();
        self.stream
            .push_str(&format!("\\begin{{{}}}\n", layout.latex_name));

        let mut index = start;
        while index < run_end {
            if pars[index].depth > depth {
                index = self.render_deeper(pars, index, run_end, container, prefix, depth)?;
            } else {
                self.render_paragraph(pars, index, container, prefix, suppress_lang)?;
                index += 1;
            }
        }

        self.stream.ensure_line_start();
        self.stream
            .push_str(&format!("\\end{{{}}}\n", layout.latex_name));
        if run_end < end {
            self.stream.newline();
        }
        Ok(run_end)
    }

    /// Declared language shared by every run member at the run's own
    /// depth, if they agree.
    fn run_language(&self, run: &[Paragraph], depth: usize) -> Option<&'static Language> {
        let mut shared: Option<&'static Language> = None;
        for par in run.iter().filter(|par| par.depth == depth) {
            let lang = self.paragraph_language(par);
            match shared {
                None => shared = Some(lang),
                Some(existing) if existing.id == lang.id => {}
                Some(_) => return None,
            }
        }
        shared
    }

    /// A run whose depth increased relative to the caller: wrap it in
    /// an indentation block and recurse until depth returns.
    fn render_deeper(
        &mut self,
        pars: &[Paragraph],
        start: usize,
        end: usize,
        container: InsetId,
        prefix: &DocPos,
        base_depth: usize,
    ) -> RenderResult<usize> {
        let mut run_end = start;
        let mut inner_base = usize::MAX;
        while run_end < end && pars[run_end].depth > base_depth {
            inner_base = inner_base.min(pars[run_end].depth);
            run_end += 1;
        }
        self.stream.ensure_line_start();
        self.stream
            .push_str("\\begin{adjustwidth}{\\parindent}{0pt}\n");
        self.hints.note_package("changepage");
        self.render_run(pars, start, run_end, container, prefix, inner_base)?;
        self.stream.ensure_line_start();
        self.stream.push_str("\\end{adjustwidth}\n");
        if run_end < end {
            self.stream.newline();
        }
        Ok(run_end)
    }

    /// One paragraph: language and encoding transitions, the content
    /// itself, and the separator towards the next paragraph.
    fn render_paragraph(
        &mut self,
        pars: &[Paragraph],
        index: usize,
        container: InsetId,
        prefix: &DocPos,
        suppress_lang: bool,
    ) -> RenderResult<()> {
        let par = &pars[index];
        let lang = self.paragraph_language(par);

        // Macro visibility depends on live document content; refresh
        // before anything here can invoke a macro.
        if paragraph_uses_macros(par) {
            let graph = self.graph;
            let key = self.doc_key;
            self.macros.update(graph, key);
        }

        // Encoding first: its switch markup must sit outside any
        // language span opened below.
        if !self.global_encoding_switch {
            let active = self.active_encoding();
            if let Some(target) = paragraph_encoding(par, lang, active) {
                self.switches.switch_encoding(&mut self.stream, target);
                self.hints.note_encoding(target);
            }
        }

        let span_mark = self.switches.span_mark();
        let mut span_opened = false;
        if !suppress_lang && lang.id != self.current_lang.id {
            if lang.rtl != self.current_lang.rtl && lang.has_babel() {
                // A direction change brackets the paragraph explicitly.
                self.stream.ensure_line_start();
                self.switches.open_span(&mut self.stream, lang);
                self.hints.note_language(lang);
                span_opened = true;
            } else if lang.has_babel() {
                self.select_language(lang);
            }
            // Languages without a babel name switch via their encoding.
        }

        self.stream.start_text(par.id, 0);
        match par.layout.kind {
            LayoutKind::Command => {
                self.stream
                    .push_str(&format!("\\{}{{", par.layout.latex_name));
                self.emit_elements(par, prefix, container, index)?;
                self.stream.push('}');
            }
            LayoutKind::Paragraph | LayoutKind::Environment => {
                self.emit_elements(par, prefix, container, index)?;
            }
        }

        // A direction bracket pops before the paragraph ends, even
        // without an explicit language closure here.
        if span_opened {
            self.switches.close_spans_to(&mut self.stream, span_mark);
        }
        self.stream.ensure_line_start();

        // Blank-line separator between paragraphs sharing style, depth
        // and indentation.
        if let Some(next) = pars.get(index + 1) {
            if next.layout.same_run(&par.layout) && next.depth == par.depth {
                self.stream.newline();
            }
        }
        Ok(())
    }

    fn paragraph_language(&self, par: &Paragraph) -> &'static Language {
        par.language
            .as_deref()
            .map(language_or_default)
            .unwrap_or(self.default_lang)
    }

    fn select_language(&mut self, lang: &'static Language) {
        self.stream.ensure_line_start();
        self.stream
            .push_str(&format!("\\selectlanguage{{{}}}\n", lang.babel));
        self.hints.note_language(lang);
        self.current_lang = lang;
    }

    /// Close the pass: the switch machine must end fully closed.
    fn finish(mut self) -> RenderResult<RenderOutput> {
        self.switches.finish(&mut self.stream)?;
        let (content, rows) = self.stream.finish();
        Ok(RenderOutput {
            content,
            rows,
            uncodable: self.uncodable,
            warnings: self.warnings,
            hints: self.hints,
        })
    }
}

/// Scan ahead within the paragraph: the first character the active
/// encoding cannot represent decides whether a switch to the
/// paragraph language's encoding is due at the paragraph start.
/// ASCII-only paragraphs never force a switch.
fn paragraph_encoding(
    par: &Paragraph,
    lang: &'static Language,
    active: &'static crate::data::Encoding,
) -> Option<&'static crate::data::Encoding> {
    let target = encoding_or_default(lang.encoding);
    if target.name == active.name {
        return None;
    }
    let first_unencodable = par.chars().find(|ch| !active.can_encode(*ch))?;
    if target.can_encode(first_unencodable) {
        Some(target)
    } else {
        None
    }
}

fn paragraph_uses_macros(par: &Paragraph) -> bool {
    par.elements.iter().any(|element| {
        matches!(
            element,
            Element::Inset(Inset::MacroCall(_)) | Element::Inset(Inset::Math(_))
        )
    })
}
