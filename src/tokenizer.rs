//! Text normalization and tokenization.
//!
//! Steps, in order:
//! 1. Decode HTML entities (numeric references plus `quot`, `apos`, `amp`,
//!    `lt`, `gt`, `nbsp`)
//! 2. Strip CDATA markers and markup tags
//! 3. Replace everything that is not a Unicode letter, combining mark,
//!    whitespace or hyphen with a space
//! 4. Collapse whitespace, lowercase, split
//! 5. Keep tokens of 3..=49 characters that contain a letter and are not all digits
//!
//! Tokenization is pure: the same input always yields the same sequence.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Shortest token kept, in characters.
pub const MIN_TOKEN_CHARS: usize = 3;
/// Longest token kept, in characters.
pub const MAX_TOKEN_CHARS: usize = 49;

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[a-zA-Z][a-zA-Z0-9]{1,31});")
        .expect("entity regex")
});
static CDATA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<!\[CDATA\[|\]\]>").expect("cdata regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag regex"));
static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{M}\s-]+").expect("non-word regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Split free text into countable words.
pub fn tokenize(text: &str) -> Vec<String> {
    let decoded = decode_entities(text);
    let unwrapped = strip_cdata(&decoded);
    let stripped = strip_tags(&unwrapped);
    let letters_only = NON_WORD_RE.replace_all(&stripped, " ");
    let collapsed = WHITESPACE_RE.replace_all(&letters_only, " ");

    collapsed
        .to_lowercase()
        .split_whitespace()
        .filter(|token| is_countable(token))
        .map(str::to_string)
        .collect()
}

fn is_countable(token: &str) -> bool {
    let len = token.chars().count();
    (MIN_TOKEN_CHARS..=MAX_TOKEN_CHARS).contains(&len)
        && !token.chars().all(|c| c.is_ascii_digit())
        && token.chars().any(char::is_alphabetic)
}

/// Decode numeric character references and the named entities the feed uses.
///
/// Unknown or invalid references are left untouched.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    ENTITY_RE.replace_all(text, |caps: &regex::Captures<'_>| {
        let raw = &caps[0];
        match quick_xml::escape::unescape_with(raw, named_entity) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.to_string(),
        }
    })
}

fn named_entity(name: &str) -> Option<&'static str> {
    match name {
        "quot" => Some("\""),
        "apos" => Some("'"),
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "nbsp" => Some("\u{a0}"),
        _ => None,
    }
}

/// Remove `<![CDATA[` and `]]>` markers, keeping the enclosed text.
pub fn strip_cdata(text: &str) -> Cow<'_, str> {
    CDATA_RE.replace_all(text, "")
}

/// Remove markup tags, keeping the text between them.
pub fn strip_tags(text: &str) -> Cow<'_, str> {
    TAG_RE.replace_all(text, "")
}
