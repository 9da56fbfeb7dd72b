//! Markup substitutes for characters outside the active encoding.
//!
//! Every replacement is plain ASCII LaTeX, so a substitute is always
//! safe to emit regardless of the open encoding.

use phf::phf_map;

static SUBSTITUTES: phf::Map<char, &'static str> = phf_map! {
    '§' => "\\S{}",
    '¶' => "\\P{}",
    '†' => "\\dag{}",
    '‡' => "\\ddag{}",
    '©' => "\\textcopyright{}",
    '®' => "\\textregistered{}",
    '™' => "\\texttrademark{}",
    '€' => "\\texteuro{}",
    '£' => "\\pounds{}",
    '…' => "\\dots{}",
    '–' => "--",
    '—' => "---",
    '‘' => "`",
    '’' => "'",
    '“' => "``",
    '”' => "''",
    '\u{00A0}' => "~",
    '±' => "\\(\\pm\\)",
    '×' => "\\(\\times\\)",
    '·' => "\\(\\cdot\\)",
    '°' => "\\(^\\circ\\)",
    'µ' => "\\(\\mu\\)",
    'ß' => "\\ss{}",
    'á' => "\\'a",
    'à' => "\\`a",
    'ä' => "\\\"a",
    'é' => "\\'e",
    'è' => "\\`e",
    'ê' => "\\^e",
    'ö' => "\\\"o",
    'ü' => "\\\"u",
    'ñ' => "\\~n",
    'ç' => "\\c{c}",
};

/// Markup substitute for a character, if one exists.
pub fn substitute(ch: char) -> Option<&'static str> {
    SUBSTITUTES.get(&ch).copied()
}
