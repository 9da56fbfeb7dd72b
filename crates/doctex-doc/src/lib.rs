//! Document tree model for LaTeX serialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod pos;

pub use pos::{DocPos, PosFrame, ROOT_CONTAINER};

/// Identifier of a content container (inset). `0` is reserved for the
/// document root.
pub type InsetId = u32;

/// Identifier of a paragraph, unique across the whole document bundle.
pub type ParagraphId = u32;

/// A bundle of documents connected by inclusion. Inclusion edges may
/// form cycles; resolution guards against them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentGraph {
    /// Key of the document generation starts from.
    pub root: String,
    pub documents: BTreeMap<String, Document>,
}

impl DocumentGraph {
    /// Create a graph holding a single root document.
    pub fn single(key: impl Into<String>, document: Document) -> Self {
        let key = key.into();
        let mut documents = BTreeMap::new();
        documents.insert(key.clone(), document);
        Self {
            root: key,
            documents,
        }
    }

    pub fn root_document(&self) -> Option<&Document> {
        self.documents.get(&self.root)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
    #[serde(default)]
    pub settings: DocumentSettings,
}

impl Document {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            settings: DocumentSettings::default(),
        }
    }

    pub fn with_settings(paragraphs: Vec<Paragraph>, settings: DocumentSettings) -> Self {
        Self {
            paragraphs,
            settings,
        }
    }

    /// Exclusive upper bound of the top-level macro scope: by convention
    /// the frame at "last paragraph index + 2".
    pub fn macro_scope_end(&self) -> DocPos {
        DocPos::root(self.paragraphs.len() + 1, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSettings {
    /// Default language id (see the static language table).
    pub language: String,
    /// Default encoding name (see the static encoding table).
    pub encoding: String,
    /// Emit one document-wide encoding switch instead of per-paragraph
    /// switches.
    #[serde(default)]
    pub global_encoding_switch: bool,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            language: "english".to_string(),
            encoding: "ascii".to_string(),
            global_encoding_switch: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub id: ParagraphId,
    pub layout: Layout,
    /// Nesting depth relative to the surrounding run.
    #[serde(default)]
    pub depth: usize,
    /// Declared language id; `None` inherits the document default.
    #[serde(default)]
    pub language: Option<String>,
    pub elements: Vec<Element>,
}

impl Paragraph {
    /// A plain paragraph holding a single character run.
    pub fn text(id: ParagraphId, content: impl Into<String>) -> Self {
        Self {
            id,
            layout: Layout::plain(),
            depth: 0,
            language: None,
            elements: vec![Element::Chars(content.into())],
        }
    }

    /// Number of positions in the paragraph: each character and each
    /// inset occupies one offset slot.
    pub fn len(&self) -> usize {
        self.elements
            .iter()
            .map(|element| match element {
                Element::Chars(text) => text.chars().count(),
                Element::Inset(_) => 1,
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All plain characters of the paragraph, in order.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.elements.iter().flat_map(|element| match element {
            Element::Chars(text) => text.chars().collect::<Vec<_>>().into_iter(),
            Element::Inset(_) => Vec::new().into_iter(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Element {
    /// A run of plain characters, one offset slot per character.
    Chars(String),
    /// A nested unit occupying a single offset slot.
    Inset(Inset),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inset {
    Container(Container),
    Math(Math),
    MacroDef(MacroDef),
    Include(Include),
    MacroCall(MacroCall),
}

/// A nested text container with its own paragraph list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: InsetId,
    pub kind: ContainerKind,
    /// A container may force its own macro scope, ending at its close.
    #[serde(default)]
    pub own_macro_scope: bool,
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerKind {
    Footnote,
    Marginal,
    Boxed,
}

/// A math inset: a list of opaque cell payloads, already in math markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Math {
    pub id: InsetId,
    pub cells: Vec<String>,
}

/// A user macro definition item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroDef {
    pub name: String,
    #[serde(default)]
    pub num_args: usize,
    pub replacement: String,
}

/// Reference to a child document embedded at this position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Include {
    pub child: String,
}

/// An invocation of a user macro with literal arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroCall {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Per-paragraph style metadata, the part of a layout definition the
/// serializer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub name: String,
    pub kind: LayoutKind,
    /// LaTeX token the layout maps to: an environment name or a command
    /// name, unused for plain paragraphs.
    #[serde(default)]
    pub latex_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutKind {
    /// Plain text paragraph, no wrapper markup.
    Paragraph,
    /// One-shot command wrapping the paragraph content, e.g. `\section`.
    Command,
    /// Contiguous same-style runs share one `\begin`/`\end` pair.
    Environment,
}

impl Layout {
    pub fn plain() -> Self {
        Self {
            name: "Standard".to_string(),
            kind: LayoutKind::Paragraph,
            latex_name: String::new(),
        }
    }

    pub fn command(name: impl Into<String>, latex_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: LayoutKind::Command,
            latex_name: latex_name.into(),
        }
    }

    pub fn environment(name: impl Into<String>, latex_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: LayoutKind::Environment,
            latex_name: latex_name.into(),
        }
    }

    /// Whether two paragraphs belong to the same environment run.
    pub fn same_run(&self, other: &Layout) -> bool {
        self.kind == other.kind && self.latex_name == other.latex_name
    }
}
