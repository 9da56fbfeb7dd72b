//! Language table.

use phf::phf_map;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub id: &'static str,
    /// Babel name used in `\selectlanguage` and language environments.
    /// Empty for languages driven purely by a CJK encoding switch.
    pub babel: &'static str,
    /// Right-to-left script.
    pub rtl: bool,
    /// Default encoding name for content in this language.
    pub encoding: &'static str,
}

impl Language {
    pub fn has_babel(&self) -> bool {
        !self.babel.is_empty()
    }
}

/// Fallback for unknown language ids.
pub const ENGLISH: Language = Language {
    id: "english",
    babel: "english",
    rtl: false,
    encoding: "ascii",
};

static LANGUAGES: phf::Map<&'static str, Language> = phf_map! {
    "english" => ENGLISH,
    "german" => Language {
        id: "german",
        babel: "ngerman",
        rtl: false,
        encoding: "latin1",
    },
    "french" => Language {
        id: "french",
        babel: "french",
        rtl: false,
        encoding: "latin1",
    },
    "spanish" => Language {
        id: "spanish",
        babel: "spanish",
        rtl: false,
        encoding: "latin1",
    },
    "russian" => Language {
        id: "russian",
        babel: "russian",
        rtl: false,
        encoding: "utf8",
    },
    "hebrew" => Language {
        id: "hebrew",
        babel: "hebrew",
        rtl: true,
        encoding: "utf8",
    },
    "arabic" => Language {
        id: "arabic",
        babel: "arabic",
        rtl: true,
        encoding: "utf8",
    },
    "japanese" => Language {
        id: "japanese",
        babel: "",
        rtl: false,
        encoding: "euc-jp",
    },
    "chinese" => Language {
        id: "chinese",
        babel: "",
        rtl: false,
        encoding: "gbk",
    },
};

pub fn language(id: &str) -> Option<&'static Language> {
    LANGUAGES.get(id)
}

/// Look up a language, falling back to English for unknown ids.
pub fn language_or_default(id: &str) -> &'static Language {
    language(id).unwrap_or(&ENGLISH)
}
