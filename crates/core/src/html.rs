//! HTML entity normalization for question feeds.
//!
//! Trivia sources ship prompts and answers with entities (`&quot;`, `&#039;`, `&eacute;`).
//! Questions are decoded once when loaded so every later comparison works on plain text.

/// Decode named (full HTML5 set), decimal and hexadecimal character references.
///
/// Unknown names and malformed references are kept verbatim.
#[must_use]
pub fn decode_entities(input: &str) -> String {
    html_escape::decode_html_entities(input).into_owned()
}
