//! Text helpers shared by the resolver, parser and session layers.

/// Lowercases and trims a question, collapsing runs of whitespace.
#[must_use]
pub fn normalize(question: &str) -> String {
    question
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Returns true if `needle` occurs in `haystack` on word boundaries.
///
/// Both inputs are compared as given; callers lowercase them first.
#[must_use]
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let bytes = haystack.as_bytes();
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let begin = start + pos;
        let end = begin + needle.len();
        let left_ok = begin == 0 || !is_word_byte(bytes[begin - 1]);
        let right_ok = end == bytes.len() || !is_word_byte(bytes[end]);
        if left_ok && right_ok {
            return true;
        }
        start = begin + haystack[begin..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

/// Returns true if any of the phrases occurs on word boundaries.
#[must_use]
pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| contains_phrase(haystack, n))
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Filler words ignored by keyword extraction, role clauses and context carry-over.
pub const STOP_WORDS: &[&str] = &[
    "a", "all", "an", "and", "any", "are", "as", "at", "by", "can", "data", "do", "does",
    "each", "every", "for", "from", "get", "give", "have", "having", "how", "i", "in", "is",
    "it", "list", "me", "more", "my", "of", "on", "or", "our", "per", "please", "show", "tell",
    "than", "that", "the", "their", "them", "there", "these", "this", "those", "to", "total",
    "us", "was", "what", "which", "who", "whose", "with", "you", "your",
];

/// Returns true for words carrying no column or value meaning.
#[must_use]
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Splits lowercase text into alphanumeric words.
pub fn words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|w| !w.is_empty())
}

/// Title-cases a phrase: the first letter of each alphabetic run is
/// uppercased and the rest lowercased.
#[must_use]
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Drops a trailing plural `s` from a single word.
#[must_use]
pub fn singular(word: &str) -> &str {
    if word.len() > 1 {
        word.strip_suffix('s').unwrap_or(word)
    } else {
        word
    }
}

/// Lowercases the first character of a sentence.
#[must_use]
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
