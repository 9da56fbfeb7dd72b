//! Character-encoding table.
//!
//! Each encoding maps to the LaTeX package machinery that realizes it:
//! `inputenc`-style encodings are switched with a single directive,
//! CJK encodings bracket their content in a `CJK` environment, and
//! `none` encodings need no package at all.

use phf::phf_map;

/// Package machinery an encoding is realized with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingPackage {
    /// No package involvement; the repertoire is directly writable.
    None,
    /// Switched via `\inputencoding{..}`.
    Inputenc,
    /// Bracketed in `\begin{CJK}{..}{}` / `\end{CJK}`.
    Cjk,
}

/// Which characters an encoding can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repertoire {
    Ascii,
    Latin1,
    Cjk,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoding {
    pub name: &'static str,
    /// Name the package wants: the `\inputencoding` argument or the
    /// CJK environment encoding.
    pub latex_name: &'static str,
    pub package: EncodingPackage,
    pub repertoire: Repertoire,
}

impl Encoding {
    pub fn can_encode(&self, ch: char) -> bool {
        match self.repertoire {
            Repertoire::Ascii => ch.is_ascii(),
            Repertoire::Latin1 => (ch as u32) <= 0xFF,
            Repertoire::Cjk => ch.is_ascii() || is_cjk(ch),
            Repertoire::Full => true,
        }
    }
}

fn is_cjk(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x11FF       // Hangul Jamo
        | 0x2E80..=0x9FFF     // CJK radicals, kana, unified ideographs
        | 0xAC00..=0xD7AF     // Hangul syllables
        | 0xF900..=0xFAFF     // CJK compatibility ideographs
        | 0xFF00..=0xFFEF)    // Halfwidth and fullwidth forms
}

/// Fallback for unknown encoding names.
pub const ASCII: Encoding = Encoding {
    name: "ascii",
    latex_name: "",
    package: EncodingPackage::None,
    repertoire: Repertoire::Ascii,
};

static ENCODINGS: phf::Map<&'static str, Encoding> = phf_map! {
    "ascii" => ASCII,
    "latin1" => Encoding {
        name: "latin1",
        latex_name: "latin1",
        package: EncodingPackage::Inputenc,
        repertoire: Repertoire::Latin1,
    },
    "latin9" => Encoding {
        name: "latin9",
        latex_name: "latin9",
        package: EncodingPackage::Inputenc,
        repertoire: Repertoire::Latin1,
    },
    "utf8" => Encoding {
        name: "utf8",
        latex_name: "utf8",
        package: EncodingPackage::Inputenc,
        repertoire: Repertoire::Full,
    },
    "euc-jp" => Encoding {
        name: "euc-jp",
        latex_name: "JIS",
        package: EncodingPackage::Cjk,
        repertoire: Repertoire::Cjk,
    },
    "gbk" => Encoding {
        name: "gbk",
        latex_name: "GBK",
        package: EncodingPackage::Cjk,
        repertoire: Repertoire::Cjk,
    },
    "big5" => Encoding {
        name: "big5",
        latex_name: "Bg5",
        package: EncodingPackage::Cjk,
        repertoire: Repertoire::Cjk,
    },
    "utf8-cjk" => Encoding {
        name: "utf8-cjk",
        latex_name: "UTF8",
        package: EncodingPackage::Cjk,
        repertoire: Repertoire::Full,
    },
};

pub fn encoding(name: &str) -> Option<&'static Encoding> {
    ENCODINGS.get(name)
}

/// Look up an encoding, falling back to plain ASCII for unknown names.
pub fn encoding_or_default(name: &str) -> &'static Encoding {
    encoding(name).unwrap_or(&ASCII)
}
