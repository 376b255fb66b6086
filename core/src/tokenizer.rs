//! Whitespace tokenization and the shared input validation predicate.
//!
//! Every entry point that accepts free text (documents, queries, stop words)
//! validates it through [`is_clean_text`] before doing anything else, so the
//! control-character rule lives in exactly one place.

/// Splits text into word tokens on whitespace, discarding the separators.
/// Runs of whitespace and leading/trailing whitespace produce no empty tokens.
pub fn split_into_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Returns true when the text contains no control bytes (below 0x20).
/// Multi-byte UTF-8 sequences are unaffected: their bytes are all >= 0x80.
pub fn is_clean_text(text: &str) -> bool {
    !text.bytes().any(|b| b < 0x20)
}
