//! Error handling for LaTeX generation
//!
//! This module provides the error and result types shared by the
//! serializer, the macro resolver and the row tracker.

use std::fmt;

use doctex_doc::ParagraphId;
use serde::Serialize;

/// Generation error type
#[derive(Debug, Clone)]
pub enum RenderError {
    /// A character has no representation in the active encoding and no
    /// markup substitute. Recoverable: handled per character.
    Uncodable {
        ch: char,
        par: ParagraphId,
        pos: usize,
    },
    /// Invalid input (missing root document, dangling inclusion)
    Input { message: String },
    /// IO error (for the output destination)
    Io { message: String },
    /// Internal defect (unbalanced nesting at completion)
    Internal { message: String },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Uncodable { ch, par, pos } => {
                write!(
                    f,
                    "Character '{}' (U+{:04X}) at paragraph {}, offset {} is not encodable",
                    ch, *ch as u32, par, pos
                )
            }
            RenderError::Input { message } => {
                write!(f, "Invalid input: {}", message)
            }
            RenderError::Io { message } => {
                write!(f, "IO error: {}", message)
            }
            RenderError::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for RenderError {}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for generation operations
pub type RenderResult<T> = Result<T, RenderError>;

// Convenience constructors
impl RenderError {
    pub fn uncodable(ch: char, par: ParagraphId, pos: usize) -> Self {
        RenderError::Uncodable { ch, par, pos }
    }

    pub fn input(message: impl Into<String>) -> Self {
        RenderError::Input {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        RenderError::Internal {
            message: message.into(),
        }
    }
}

/// Non-fatal issue noticed during generation
#[derive(Debug, Clone, Serialize)]
pub struct RenderWarning {
    pub message: String,
    /// Paragraph the warning belongs to, when known
    pub par: Option<ParagraphId>,
}

impl RenderWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            par: None,
        }
    }

    pub fn in_paragraph(message: impl Into<String>, par: ParagraphId) -> Self {
        Self {
            message: message.into(),
            par: Some(par),
        }
    }
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(par) = self.par {
            write!(f, "Warning in paragraph {}: {}", par, self.message)
        } else {
            write!(f, "Warning: {}", self.message)
        }
    }
}

/// One character that could not be represented in the final output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UncodableChar {
    pub ch: char,
    /// Owning paragraph
    pub par: ParagraphId,
    /// Offset range within the paragraph
    pub start: usize,
    pub end: usize,
}

impl fmt::Display for UncodableChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' (U+{:04X}) in paragraph {} at {}..{}",
            self.ch, self.ch as u32, self.par, self.start, self.end
        )
    }
}
