//! Mention detection for the persona
//!
//! A comment mentions the persona when any configured name occurs in its
//! body, ignoring case, optionally `@`-prefixed. ASCII names must stand as
//! whole words so "bot" does not fire inside "robotics"; other scripts match
//! anywhere, since they attach particles directly to names.

use board_core::{Comment, Snowflake};

/// Case-insensitive matcher over the persona's names
#[derive(Debug, Clone)]
pub struct MentionMatcher {
    names: Vec<String>,
}

impl MentionMatcher {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        Self { names }
    }

    /// Whether `text` mentions any of the names
    pub fn is_mentioned(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.names.iter().any(|name| contains_word(&text, name))
    }

    /// Whether the persona should answer `comment`
    ///
    /// The persona never answers itself. Otherwise it answers comments
    /// addressed to it and comments that mention it.
    pub fn is_candidate(&self, comment: &Comment, persona_id: Snowflake) -> bool {
        if comment.author.is_user(persona_id) {
            return false;
        }
        comment.is_addressed_to(persona_id) || self.is_mentioned(&comment.body)
    }
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();

        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        let first = needle.chars().next();
        let last = needle.chars().next_back();

        if !joins_word(before, first) && !joins_word(after, last) {
            return true;
        }

        from = start + first.map_or(1, char::len_utf8);
    }
    false
}

/// Two adjacent ASCII word characters continue the same word
fn joins_word(neighbour: Option<char>, edge: Option<char>) -> bool {
    match (neighbour, edge) {
        (Some(n), Some(e)) => is_ascii_word(n) && is_ascii_word(e),
        _ => false,
    }
}

fn is_ascii_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
