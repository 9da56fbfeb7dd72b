//! Output stream that feeds the row tracker.
//!
//! All generated text flows through here so that every emitted newline
//! terminates exactly one tracked row.

use crate::core::rowmap::RowTracker;
use doctex_doc::{InsetId, ParagraphId};

#[derive(Debug, Default)]
pub struct LatexStream {
    buf: String,
    rows: RowTracker,
}

impl LatexStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ch: char) {
        self.buf.push(ch);
        if ch == '\n' {
            self.rows.newline();
        }
    }

    pub fn push_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.push(ch);
        }
    }

    pub fn newline(&mut self) {
        self.push('\n');
    }

    /// Start a new line unless already at one.
    pub fn ensure_line_start(&mut self) {
        if !self.at_line_start() {
            self.newline();
        }
    }

    pub fn at_line_start(&self) -> bool {
        self.buf.is_empty() || self.buf.ends_with('\n')
    }

    /// Record a candidate text entry for the current line.
    pub fn start_text(&mut self, par: ParagraphId, pos: usize) -> bool {
        self.rows.start_text(par, pos)
    }

    /// Record a math-cell entry for the current line.
    pub fn start_math(&mut self, inset: InsetId, cell: usize) {
        self.rows.start_math(inset, cell)
    }

    pub fn content(&self) -> &str {
        &self.buf
    }

    pub fn finish(mut self) -> (String, RowTracker) {
        self.rows.finish();
        (self.buf, self.rows)
    }
}
