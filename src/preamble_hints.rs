//! Preamble requirements collected while generating the body.
//!
//! The serializer only emits body markup; the caller owns the preamble.
//! Everything the body relies on is recorded here in first-use order so
//! the caller can turn it into `\usepackage` lines.

use indexmap::IndexSet;

use crate::data::{Encoding, EncodingPackage, Language};

#[derive(Debug, Clone, Default)]
pub struct PreambleHints {
    /// Babel names, in first-use order. The document language comes
    /// first.
    languages: IndexSet<&'static str>,
    /// `inputenc` option names, in first-use order.
    encodings: IndexSet<&'static str>,
    /// Support packages, in first-use order.
    packages: IndexSet<&'static str>,
}

impl PreambleHints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note_language(&mut self, lang: &'static Language) {
        if lang.has_babel() {
            self.languages.insert(lang.babel);
        }
    }

    pub fn note_encoding(&mut self, enc: &'static Encoding) {
        match enc.package {
            EncodingPackage::Inputenc => {
                self.encodings.insert(enc.latex_name);
            }
            EncodingPackage::Cjk => {
                self.packages.insert("CJK");
            }
            EncodingPackage::None => {}
        }
    }

    pub fn note_package(&mut self, name: &'static str) {
        self.packages.insert(name);
    }

    pub fn languages(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.languages.iter().copied()
    }

    pub fn packages(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.packages.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty() && self.encodings.is_empty() && self.packages.is_empty()
    }

    /// Render the collected requirements as `\usepackage` lines.
    pub fn usepackage_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.encodings.is_empty() {
            let options: Vec<&str> = self.encodings.iter().copied().collect();
            lines.push(format!("\\usepackage[{}]{{inputenc}}", options.join(",")));
        }
        if !self.languages.is_empty() {
            let options: Vec<&str> = self.languages.iter().copied().collect();
            lines.push(format!("\\usepackage[{}]{{babel}}", options.join(",")));
        }
        for package in &self.packages {
            lines.push(format!("\\usepackage{{{}}}", package));
        }
        lines
    }
}
