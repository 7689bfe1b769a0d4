//! Search-term handling for image lookup.
//!
//! Builds the query sent to image search and derives fallback keywords from
//! a slide's own text when the model-supplied ones find nothing.

use crate::Slide;
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Maximum number of derived keywords.
pub const MAX_DERIVED_KEYWORDS: usize = 5;

/// Regex matching a word, allowing an inner apostrophe ("water's").
static WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+(?:['\u{2019}][\p{L}]+)?").unwrap());

/// Regex matching the end of the first sentence.
static SENTENCE_END_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?](?:\s|$)").unwrap());

/// Words that never make useful image queries.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "how", "in", "is", "it",
    "its", "of", "on", "or", "that", "the", "this", "to", "was", "were", "what", "when",
    "where", "which", "who", "why", "will", "with", "your", "our", "we", "you", "can",
    "into", "about", "these", "those", "their", "there", "they",
];

/// Join keywords into a single query string, skipping blanks.
pub fn search_query(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derive up to five search terms from a slide's title and the first
/// sentence of its description.
pub fn derive_keywords(slide: &Slide) -> Vec<String> {
    let source = format!("{} {}", slide.title, first_sentence(&slide.description));
    let normalized: String = source.nfkc().collect();

    let mut keywords: Vec<String> = Vec::new();
    for m in WORD_REGEX.find_iter(&normalized) {
        let word = m.as_str().to_lowercase();
        if word.chars().count() < 2 || STOP_WORDS.contains(&word.as_str()) {
            continue;
        }
        if !keywords.contains(&word) {
            keywords.push(word);
        }
        if keywords.len() == MAX_DERIVED_KEYWORDS {
            break;
        }
    }

    log::debug!("Derived keywords for '{}': {:?}", slide.title, keywords);
    keywords
}

/// Text up to and including the first sentence terminator.
fn first_sentence(text: &str) -> &str {
    match SENTENCE_END_REGEX.find(text) {
        Some(m) => &text[..m.start() + 1],
        None => text,
    }
}
