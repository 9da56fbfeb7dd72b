//! Path-based document positions with depth-first total order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::InsetId;

/// Container id of the document root.
pub const ROOT_CONTAINER: InsetId = 0;

/// One step of a document position: a location inside the paragraph
/// list of `container`.
///
/// For two positions of the same document whose frame prefixes agree,
/// the container at the first differing frame is necessarily the same,
/// so the derived lexicographic order over `(container, par, pos)` is
/// depth-first document order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PosFrame {
    pub container: InsetId,
    /// Paragraph index within the container's paragraph list.
    pub par: usize,
    /// Offset within the paragraph (characters and insets each count
    /// one slot).
    pub pos: usize,
}

impl PosFrame {
    pub fn new(container: InsetId, par: usize, pos: usize) -> Self {
        Self {
            container,
            par,
            pos,
        }
    }
}

/// A document position: frames root-first. A prefix orders before all
/// of its extensions.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct DocPos {
    frames: Vec<PosFrame>,
}

impl DocPos {
    /// A top-level position in the root paragraph list.
    pub fn root(par: usize, pos: usize) -> Self {
        Self {
            frames: vec![PosFrame::new(ROOT_CONTAINER, par, pos)],
        }
    }

    /// A position ordered after every real document position. Used for
    /// "latest visible definition" lookups.
    pub fn past_end() -> Self {
        Self {
            frames: vec![PosFrame::new(ROOT_CONTAINER, usize::MAX, 0)],
        }
    }

    pub fn frames(&self) -> &[PosFrame] {
        &self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Extend the position with a deeper frame.
    pub fn descended(&self, frame: PosFrame) -> Self {
        let mut frames = self.frames.clone();
        frames.push(frame);
        Self { frames }
    }

    /// The same position with the innermost offset advanced by `n`.
    /// Gives the position "just after" the inset the position points at.
    pub fn advanced(&self, n: usize) -> Self {
        let mut frames = self.frames.clone();
        if let Some(last) = frames.last_mut() {
            last.pos += n;
        }
        Self { frames }
    }

    /// Whether `self` is a proper prefix of `other`.
    pub fn is_prefix_of(&self, other: &DocPos) -> bool {
        self.frames.len() < other.frames.len()
            && other.frames[..self.frames.len()] == self.frames[..]
    }
}

impl fmt::Display for DocPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}:{}.{}", frame.container, frame.par, frame.pos)?;
        }
        Ok(())
    }
}
