//! Text normalization applied to documents before training or scoring

use unicode_normalization::UnicodeNormalization;

/// Normalize raw document text.
///
/// Applies NFKC, turns non-breaking spaces into ordinary spaces, collapses
/// every whitespace run to a single space and trims both ends. The result is
/// a fixed point: normalizing it again returns it unchanged.
pub fn normalize_text(raw: &str) -> String {
    let composed: String = raw
        .nfkc()
        .map(|c| if c == '\u{00A0}' { ' ' } else { c })
        .collect();

    let mut out = String::with_capacity(composed.len());
    for word in composed.split(is_separator).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Unicode whitespace plus the ASCII file/group/record/unit separators
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1C}'..='\u{1F}').contains(&c)
}
