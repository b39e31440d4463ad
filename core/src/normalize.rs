//! Text normalization for scoring.
//!
//! Only alphabetic characters and the ASCII space survive. Everything else is
//! removed in place rather than replaced by a separator, so `covid-19` becomes
//! the single token `covid` and `well-known` becomes `wellknown`. Tabs and
//! newlines are removed as well, joining the words around them.
//!
//! "Alphabetic" is the Unicode `Alphabetic` property, applied after NFC
//! composition. That is wider than the letter categories alone: a decomposed
//! `e` + combining acute composes to `é` and stays inside its word, and letter
//! numbers such as `Ⅷ` (category Nl) are kept as tokens. A letters-only filter
//! without composition would give `cafe` and drop `Ⅷ`.

use unicode_normalization::UnicodeNormalization;

/// Split `text` into alphabetic tokens without changing case.
pub fn normalize(text: &str) -> Vec<String> {
    normalize_with(text, false)
}

/// Like [`normalize`], lowercasing each token when `fold_case` is set.
pub fn normalize_with(text: &str, fold_case: bool) -> Vec<String> {
    let kept: String = text
        .nfc()
        .filter(|c| c.is_alphabetic() || *c == ' ')
        .collect();
    kept.split(' ')
        .filter(|t| !t.is_empty())
        .map(|t| if fold_case { t.to_lowercase() } else { t.to_string() })
        .collect()
}
