//! Output-line to document-position tracking.
//!
//! Every newline the serializer emits terminates one logical output
//! line; the tracker records which paragraph offsets and math cells
//! produced it, and answers line↔position queries after generation.

use doctex_doc::{InsetId, ParagraphId};
use serde::Serialize;

/// Primary association of a line: the paragraph offset that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextEntry {
    pub par: ParagraphId,
    pub pos: usize,
}

/// Association with a math cell emitted on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MathEntry {
    pub inset: InsetId,
    pub cell: usize,
}

/// All associations of one output line: at most one primary text entry,
/// any number of math entries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RowEntry {
    pub text: Option<TextEntry>,
    pub math: Vec<MathEntry>,
}

impl RowEntry {
    fn is_empty(&self) -> bool {
        self.text.is_none() && self.math.is_empty()
    }
}

/// Grows with the output during one generation pass; rebuilt from
/// scratch on every pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RowTracker {
    rows: Vec<RowEntry>,
    current: RowEntry,
}

impl RowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a candidate text entry for the current line. Only the
    /// first text entry per line becomes the primary one; the return
    /// value reports whether this call did.
    pub fn start_text(&mut self, par: ParagraphId, pos: usize) -> bool {
        if self.current.text.is_some() {
            return false;
        }
        self.current.text = Some(TextEntry { par, pos });
        true
    }

    /// Record a math-cell entry for the current line. Always appended.
    pub fn start_math(&mut self, inset: InsetId, cell: usize) {
        self.current.math.push(MathEntry { inset, cell });
    }

    /// Terminate the current line.
    pub fn newline(&mut self) {
        let entry = std::mem::take(&mut self.current);
        self.rows.push(entry);
    }

    pub fn newlines(&mut self, n: usize) {
        for _ in 0..n {
            self.newline();
        }
    }

    /// Close the trailing line, if it carries any association.
    pub fn finish(&mut self) {
        if !self.current.is_empty() {
            self.newline();
        }
    }

    /// Number of recorded lines.
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn entries(&self) -> &[RowEntry] {
        &self.rows
    }

    /// 1-based output line whose primary entry best matches the given
    /// paragraph offset: the first line recording the greatest offset
    /// not past `pos`, falling back to the paragraph's first line.
    pub fn row_for_text(&self, par: ParagraphId, pos: usize) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        let mut first: Option<usize> = None;
        for (index, row) in self.rows.iter().enumerate() {
            let Some(entry) = row.text else { continue };
            if entry.par != par {
                continue;
            }
            if first.is_none() {
                first = Some(index);
            }
            if entry.pos <= pos {
                match best {
                    Some((_, best_pos)) if best_pos >= entry.pos => {}
                    _ => best = Some((index, entry.pos)),
                }
            }
        }
        best.map(|(index, _)| index + 1).or(first.map(|i| i + 1))
    }

    /// 1-based line holding a cell of the given math inset.
    pub fn row_for_math(&self, inset: InsetId, cell: usize) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| {
                row.math
                    .iter()
                    .any(|entry| entry.inset == inset && entry.cell == cell)
            })
            .map(|index| index + 1)
    }

    /// Primary text entry of a 1-based output line, walking backward to
    /// the nearest earlier mapped line when the line itself carries
    /// none. `None` when nothing maps.
    pub fn entry_at(&self, line: usize) -> Option<TextEntry> {
        if line == 0 || line > self.rows.len() {
            return None;
        }
        self.rows[..line]
            .iter()
            .rev()
            .find_map(|row| row.text)
    }

    /// Math entries recorded for a 1-based output line.
    pub fn math_at(&self, line: usize) -> &[MathEntry] {
        if line == 0 || line > self.rows.len() {
            return &[];
        }
        &self.rows[line - 1].math
    }
}
