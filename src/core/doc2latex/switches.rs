//! Encoding and language switch state machine.
//!
//! Tracks which encoding package is textually open in the generated
//! stream and which language spans are bracketing the current content.
//! Only one encoding mode can be open at a time; language spans stack
//! because direction changes nest. Everything opened during a
//! generation pass must be closed when it completes.

use tracing::debug;

use super::stream::LatexStream;
use crate::data::{Encoding, EncodingPackage, Language};
use crate::utils::error::{RenderError, RenderResult};

/// The encoding package currently open in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingMode {
    #[default]
    Closed,
    Inputenc(&'static Encoding),
    Cjk(&'static Encoding),
}

#[derive(Debug, Default)]
pub struct SwitchState {
    mode: EncodingMode,
    /// Open language spans, outermost first (babel names).
    spans: Vec<&'static Language>,
}

impl SwitchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    /// Encoding currently governing the stream, if any switch is open.
    pub fn current_encoding(&self) -> Option<&'static Encoding> {
        match self.mode {
            EncodingMode::Closed => None,
            EncodingMode::Inputenc(enc) | EncodingMode::Cjk(enc) => Some(enc),
        }
    }

    /// Move the stream to the given encoding, emitting whatever close
    /// and open markup the transition requires. Switching to the same
    /// inputenc mode under a different name re-emits only the name
    /// change.
    pub fn switch_encoding(&mut self, stream: &mut LatexStream, target: &'static Encoding) {
        match (self.mode, target.package) {
            (EncodingMode::Inputenc(open), EncodingPackage::Inputenc) if open.name == target.name => {}
            (_, EncodingPackage::Inputenc) => {
                self.close_mode(stream);
                stream.ensure_line_start();
                stream.push_str(&format!("\\inputencoding{{{}}}\n", target.latex_name));
                self.mode = EncodingMode::Inputenc(target);
            }
            (EncodingMode::Cjk(open), EncodingPackage::Cjk) if open.name == target.name => {}
            (_, EncodingPackage::Cjk) => {
                self.close_mode(stream);
                stream.ensure_line_start();
                stream.push_str(&format!("\\begin{{CJK}}{{{}}}{{}}\n", target.latex_name));
                self.mode = EncodingMode::Cjk(target);
            }
            (_, EncodingPackage::None) => {
                self.close_mode(stream);
            }
        }
    }

    /// Emit the close sequence of the open mode, if any.
    pub fn close_mode(&mut self, stream: &mut LatexStream) {
        match self.mode {
            EncodingMode::Cjk(_) => {
                stream.ensure_line_start();
                stream.push_str("\\end{CJK}\n");
            }
            // Leaving inputenc needs no markup; the next directive
            // overrides the name.
            EncodingMode::Inputenc(_) | EncodingMode::Closed => {}
        }
        self.mode = EncodingMode::Closed;
    }

    /// Open a direction-bracketing language span.
    pub fn open_span(&mut self, stream: &mut LatexStream, lang: &'static Language) {
        stream.push_str(&format!("\\begin{{{}}}\n", lang.babel));
        self.spans.push(lang);
    }

    /// Close the innermost language span.
    pub fn close_span(&mut self, stream: &mut LatexStream) {
        if let Some(lang) = self.spans.pop() {
            stream.ensure_line_start();
            stream.push_str(&format!("\\end{{{}}}\n", lang.babel));
        }
    }

    /// Number of open spans; used to close back down to a boundary.
    pub fn span_mark(&self) -> usize {
        self.spans.len()
    }

    pub fn close_spans_to(&mut self, stream: &mut LatexStream, mark: usize) {
        while self.spans.len() > mark {
            self.close_span(stream);
        }
    }

    /// Entering a nested container: package state must not leak past
    /// its boundary, so the open mode is closed and handed back for
    /// restoration.
    pub fn enter_container(&mut self, stream: &mut LatexStream) -> EncodingMode {
        let saved = self.mode;
        if saved != EncodingMode::Closed {
            debug!("closing encoding mode across container boundary");
        }
        self.close_mode(stream);
        saved
    }

    /// Reopen a mode saved at a container boundary. The caller closes
    /// the inner mode before the container's closing markup; this runs
    /// after it.
    pub fn restore(&mut self, stream: &mut LatexStream, saved: EncodingMode) {
        match saved {
            EncodingMode::Closed => {}
            EncodingMode::Inputenc(enc) | EncodingMode::Cjk(enc) => {
                self.switch_encoding(stream, enc);
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.mode == EncodingMode::Closed && self.spans.is_empty()
    }

    /// Top-level completion: close the open mode and verify nothing
    /// else leaked. A remaining span is an internal defect, not an
    /// input error.
    pub fn finish(&mut self, stream: &mut LatexStream) -> RenderResult<()> {
        self.close_mode(stream);
        if !self.spans.is_empty() {
            let names: Vec<&str> = self.spans.iter().map(|lang| lang.babel).collect();
            return Err(RenderError::internal(format!(
                "language span(s) still open at end of generation: {}",
                names.join(", ")
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::encoding;

    #[test]
    fn test_inputenc_rename_reemits_directive_only() {
        let mut stream = LatexStream::new();
        let mut switches = SwitchState::new();
        switches.switch_encoding(&mut stream, encoding("latin1").unwrap());
        switches.switch_encoding(&mut stream, encoding("latin9").unwrap());
        let out = stream.content();
        assert_eq!(out.matches("\\inputencoding").count(), 2);
        assert!(!out.contains("CJK"));
    }

    #[test]
    fn test_same_inputenc_is_idempotent() {
        let mut stream = LatexStream::new();
        let mut switches = SwitchState::new();
        switches.switch_encoding(&mut stream, encoding("utf8").unwrap());
        switches.switch_encoding(&mut stream, encoding("utf8").unwrap());
        assert_eq!(stream.content().matches("\\inputencoding").count(), 1);
    }

    #[test]
    fn test_cjk_transition_closes_previous_mode() {
        let mut stream = LatexStream::new();
        let mut switches = SwitchState::new();
        switches.switch_encoding(&mut stream, encoding("gbk").unwrap());
        switches.switch_encoding(&mut stream, encoding("euc-jp").unwrap());
        let out = stream.content();
        let first_end = out.find("\\end{CJK}").unwrap();
        let second_begin = out.rfind("\\begin{CJK}{JIS}{}").unwrap();
        assert!(first_end < second_begin);
        switches.close_mode(&mut stream);
        assert_eq!(stream.content().matches("\\begin{CJK}").count(), 2);
        assert_eq!(stream.content().matches("\\end{CJK}").count(), 2);
        assert!(switches.is_closed());
    }

    #[test]
    fn test_finish_reports_leaked_span() {
        let mut stream = LatexStream::new();
        let mut switches = SwitchState::new();
        switches.open_span(&mut stream, crate::data::language("hebrew").unwrap());
        let result = switches.finish(&mut stream);
        assert!(matches!(result, Err(RenderError::Internal { .. })));
    }

    #[test]
    fn test_container_boundary_restores_mode() {
        let mut stream = LatexStream::new();
        let mut switches = SwitchState::new();
        let gbk = encoding("gbk").unwrap();
        switches.switch_encoding(&mut stream, gbk);
        let saved = switches.enter_container(&mut stream);
        assert!(matches!(switches.mode(), EncodingMode::Closed));
        switches.restore(&mut stream, saved);
        assert_eq!(switches.current_encoding().map(|e| e.name), Some("gbk"));
        switches.close_mode(&mut stream);
        let out = stream.content();
        assert_eq!(out.matches("\\begin{CJK}").count(), 2);
        assert_eq!(out.matches("\\end{CJK}").count(), 2);
    }
}
