//! Inline content emission: characters, escaping, encodability, and
//! the inset kinds that can appear inside a paragraph.

use tracing::debug;

use doctex_doc::{
    Container, ContainerKind, DocPos, Element, Include, Inset, MacroCall, MacroDef, Math,
    Paragraph, ParagraphId, PosFrame,
};

use super::context::GenerationContext;
use crate::core::macros::valid_definition;
use crate::data::{substitute, Encoding};
use crate::utils::error::{RenderError, RenderResult, RenderWarning, UncodableChar};

/// Escape LaTeX special characters in arbitrary text.
pub fn escape_latex(input: &str) -> String {
    let mut out = String::new();
    for ch in input.chars() {
        match escape_special(ch) {
            Some(escaped) => out.push_str(escaped),
            None => out.push(ch),
        }
    }
    out
}

fn escape_special(ch: char) -> Option<&'static str> {
    Some(match ch {
        '\\' => "\\textbackslash{}",
        '{' => "\\{",
        '}' => "\\}",
        '$' => "\\$",
        '&' => "\\&",
        '%' => "\\%",
        '#' => "\\#",
        '_' => "\\_",
        '^' => "\\textasciicircum{}",
        '~' => "\\textasciitilde{}",
        _ => return None,
    })
}

/// Produce the markup for one character under the active encoding, or
/// the recoverable uncodable condition when it has no representation.
pub fn encode_char(
    active: &Encoding,
    ch: char,
    par: ParagraphId,
    pos: usize,
) -> RenderResult<String> {
    if let Some(escaped) = escape_special(ch) {
        return Ok(escaped.to_string());
    }
    if active.can_encode(ch) {
        return Ok(ch.to_string());
    }
    if let Some(sub) = substitute(ch) {
        return Ok(sub.to_string());
    }
    Err(RenderError::uncodable(ch, par, pos))
}

impl<'a> GenerationContext<'a> {
    /// Emit the elements of one paragraph, tracking offsets.
    pub(crate) fn emit_elements(
        &mut self,
        par: &Paragraph,
        prefix: &DocPos,
        container: doctex_doc::InsetId,
        par_index: usize,
    ) -> RenderResult<()> {
        let mut offset = 0usize;
        for element in &par.elements {
            match element {
                Element::Chars(text) => {
                    let active = self.active_encoding();
                    for ch in text.chars() {
                        self.emit_char(active, ch, par.id, offset);
                        offset += 1;
                    }
                }
                Element::Inset(inset) => {
                    let pos = prefix.descended(PosFrame::new(container, par_index, offset));
                    self.emit_inset(inset, par, &pos)?;
                    offset += 1;
                }
            }
        }
        Ok(())
    }

    /// One character: the uncodable condition is caught here, per
    /// character, and never aborts the walk.
    fn emit_char(&mut self, active: &'static Encoding, ch: char, par: ParagraphId, offset: usize) {
        match encode_char(active, ch, par, offset) {
            Ok(markup) => self.stream.push_str(&markup),
            Err(err) => {
                debug!("{}", err);
                if self.options.dry_run {
                    self.stream.push_str(&format!("[uncodable: {}]", ch));
                } else {
                    self.uncodable.push(UncodableChar {
                        ch,
                        par,
                        start: offset,
                        end: offset + 1,
                    });
                }
            }
        }
    }

    fn emit_inset(&mut self, inset: &Inset, par: &Paragraph, pos: &DocPos) -> RenderResult<()> {
        match inset {
            Inset::Math(math) => self.emit_math(math),
            Inset::Container(container) => self.emit_container(container, pos),
            Inset::MacroDef(def) => self.emit_macro_def(def),
            Inset::Include(include) => self.emit_include(include),
            Inset::MacroCall(call) => self.emit_macro_call(call, par, pos),
        }
    }

    fn emit_math(&mut self, math: &Math) -> RenderResult<()> {
        if let [cell] = math.cells.as_slice() {
            self.stream.start_math(math.id, 0);
            self.stream.push_str(&format!("\\({}\\)", cell));
        } else {
            self.stream.ensure_line_start();
            self.stream.push_str("\\begin{align*}\n");
            for (cell_index, cell) in math.cells.iter().enumerate() {
                self.stream.start_math(math.id, cell_index);
                self.stream.push_str(cell);
                if cell_index + 1 < math.cells.len() {
                    self.stream.push_str("\\\\");
                }
                self.stream.newline();
            }
            self.stream.push_str("\\end{align*}\n");
            self.hints.note_package("amsmath");
        }
        Ok(())
    }

    /// A nested container: wrapper command, recursion into its
    /// paragraphs, and encoding state protected across the boundary.
    fn emit_container(&mut self, container: &Container, pos: &DocPos) -> RenderResult<()> {
        let wrapper = match container.kind {
            ContainerKind::Footnote => "footnote",
            ContainerKind::Marginal => "marginpar",
            ContainerKind::Boxed => "mbox",
        };
        let saved_mode = self.switches.enter_container(&mut self.stream);
        let saved_lang = self.current_lang;
        let span_mark = self.switches.span_mark();

        self.stream.push_str(&format!("\\{}{{%\n", wrapper));
        self.render_run(
            &container.paragraphs,
            0,
            container.paragraphs.len(),
            container.id,
            pos,
            0,
        )?;
        // Everything the contained content opened closes before the
        // wrapper's closing brace.
        self.switches.close_spans_to(&mut self.stream, span_mark);
        self.switches.close_mode(&mut self.stream);
        self.stream.push('}');
        self.switches.restore(&mut self.stream, saved_mode);
        self.current_lang = saved_lang;
        Ok(())
    }

    fn emit_macro_def(&mut self, def: &MacroDef) -> RenderResult<()> {
        if !valid_definition(def) {
            debug!("not emitting invalid macro definition '{}'", def.name);
            return Ok(());
        }
        self.stream.ensure_line_start();
        if def.num_args > 0 {
            self.stream.push_str(&format!(
                "\\newcommand{{\\{}}}[{}]{{{}}}\n",
                def.name, def.num_args, def.replacement
            ));
        } else {
            self.stream
                .push_str(&format!("\\newcommand{{\\{}}}{{{}}}\n", def.name, def.replacement));
        }
        Ok(())
    }

    fn emit_include(&mut self, include: &Include) -> RenderResult<()> {
        if !self.graph.documents.contains_key(&include.child) {
            self.warnings.push(RenderWarning::new(format!(
                "included document '{}' could not be resolved",
                include.child
            )));
        }
        self.stream.ensure_line_start();
        self.stream
            .push_str(&format!("\\input{{{}}}\n", include.child));
        Ok(())
    }

    /// Macro-using content: visibility is refreshed by the caller; the
    /// resolver decides which definition, if any, is in effect here.
    fn emit_macro_call(
        &mut self,
        call: &MacroCall,
        par: &Paragraph,
        pos: &DocPos,
    ) -> RenderResult<()> {
        match self.macros.resolve(
            self.doc_key,
            &call.name,
            pos,
            self.options.allow_global_macros,
        ) {
            Some(data) => {
                if data.num_args != call.args.len() {
                    self.warnings.push(RenderWarning::in_paragraph(
                        format!(
                            "macro '{}' expects {} argument(s), {} given",
                            call.name,
                            data.num_args,
                            call.args.len()
                        ),
                        par.id,
                    ));
                }
            }
            None => {
                self.warnings.push(RenderWarning::in_paragraph(
                    format!("macro '{}' is not defined here", call.name),
                    par.id,
                ));
            }
        }
        self.stream.push_str(&format!("\\{}", call.name));
        if call.args.is_empty() {
            self.stream.push_str("{}");
        } else {
            for arg in &call.args {
                self.stream.push_str(&format!("{{{}}}", escape_latex(arg)));
            }
        }
        Ok(())
    }
}
