//! Reaction ledger - per-target emoji reactions
//!
//! A ledger maps each emoji to the set of actors that reacted with it. Sets
//! keep insertion order so clients render reactors in the order they arrived.
//! The exposed total is never stored independently of the sets: it is always
//! recomputed from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::DomainError;
use crate::value_objects::ActorKey;

/// Longest accepted emoji key, in bytes
pub const MAX_EMOJI_BYTES: usize = 32;

/// Outcome of a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionChange {
    Added,
    Removed,
}

/// Emoji -> distinct actor identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionLedger(BTreeMap<String, Vec<String>>);

impl ReactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate an emoji key supplied by a caller
    pub fn validate_emoji(emoji: &str) -> Result<&str, DomainError> {
        let emoji = emoji.trim();
        if emoji.is_empty() || emoji.len() > MAX_EMOJI_BYTES {
            return Err(DomainError::InvalidEmoji);
        }
        Ok(emoji)
    }

    /// Add the actor to the emoji's set, or remove it if already present
    ///
    /// An emoji whose set becomes empty is dropped from the ledger.
    pub fn toggle(&mut self, emoji: &str, actor: &ActorKey) -> ReactionChange {
        let key = actor.to_string();
        let actors = self.0.entry(emoji.to_string()).or_default();

        if let Some(pos) = actors.iter().position(|a| *a == key) {
            actors.remove(pos);
            if actors.is_empty() {
                self.0.remove(emoji);
            }
            ReactionChange::Removed
        } else {
            actors.push(key);
            ReactionChange::Added
        }
    }

    /// Sum of all set sizes
    pub fn total(&self) -> i64 {
        self.0.values().map(|actors| actors.len() as i64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, emoji: &str, actor: &ActorKey) -> bool {
        let key = actor.to_string();
        self.0
            .get(emoji)
            .is_some_and(|actors| actors.iter().any(|a| *a == key))
    }

    /// Whether the actor appears under any emoji
    pub fn reacted_by(&self, actor: &ActorKey) -> bool {
        let key = actor.to_string();
        self.0.values().any(|actors| actors.iter().any(|a| *a == key))
    }

    pub fn actors(&self, emoji: &str) -> &[String] {
        self.0.get(emoji).map_or(&[], Vec::as_slice)
    }

    /// Every (emoji, actor) pair in the ledger
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .flat_map(|(emoji, actors)| actors.iter().map(move |a| (emoji.as_str(), a.as_str())))
    }

    /// Repair a ledger read from storage: drop duplicate actors and empty sets
    pub fn normalized(mut self) -> Self {
        for actors in self.0.values_mut() {
            let mut seen = std::collections::HashSet::new();
            actors.retain(|a| seen.insert(a.clone()));
        }
        self.0.retain(|_, actors| !actors.is_empty());
        self
    }
}

impl From<BTreeMap<String, Vec<String>>> for ReactionLedger {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        Self(map).normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::Snowflake;

    fn user(id: i64) -> ActorKey {
        ActorKey::User(Snowflake::new(id))
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut ledger = ReactionLedger::new();
        let original = ledger.clone();

        assert_eq!(ledger.toggle("👍", &user(1)), ReactionChange::Added);
        assert!(ledger.contains("👍", &user(1)));
        assert_eq!(ledger.total(), 1);

        assert_eq!(ledger.toggle("👍", &user(1)), ReactionChange::Removed);
        assert_eq!(ledger, original);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_double_toggle_restores_populated_ledger() {
        let mut ledger = ReactionLedger::new();
        ledger.toggle("😍", &user(1));
        ledger.toggle("🔥", &user(2));
        let before = ledger.clone();

        ledger.toggle("😍", &user(3));
        ledger.toggle("😍", &user(3));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_total_is_sum_of_sets() {
        let mut ledger = ReactionLedger::new();
        let ops = [
            ("😍", 1),
            ("😍", 2),
            ("🔥", 1),
            ("😍", 1),
            ("👀", 3),
            ("🔥", 4),
            ("👀", 3),
        ];
        for (emoji, actor) in ops {
            ledger.toggle(emoji, &user(actor));
            let expected: i64 = ["😍", "🔥", "👀"]
                .iter()
                .map(|e| ledger.actors(e).len() as i64)
                .sum();
            assert_eq!(ledger.total(), expected);
        }
        assert_eq!(ledger.total(), 3);
    }

    #[test]
    fn test_anonymous_and_user_actors_serialize_in_order() {
        let mut ledger = ReactionLedger::new();
        ledger.toggle("😍", &user(2));
        ledger.toggle("😍", &ActorKey::resolve(None, "203.0.113.5"));

        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json, serde_json::json!({ "😍": ["2", "ip:203.0.113.5"] }));
    }

    #[test]
    fn test_normalized_repairs_stored_ledgers() {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(
            r#"{"👍": ["1", "1", "2"], "🔥": []}"#,
        )
        .unwrap();
        let ledger = ReactionLedger::from(raw);
        assert_eq!(ledger.actors("👍"), ["1".to_string(), "2".to_string()]);
        assert!(ledger.actors("🔥").is_empty());
        assert_eq!(ledger.total(), 2);
    }

    #[test]
    fn test_validate_emoji() {
        assert_eq!(ReactionLedger::validate_emoji(" 👍 ").unwrap(), "👍");
        assert!(ReactionLedger::validate_emoji("").is_err());
        assert!(ReactionLedger::validate_emoji(&"x".repeat(MAX_EMOJI_BYTES + 1)).is_err());
    }

    #[test]
    fn test_reacted_by_and_entries() {
        let mut ledger = ReactionLedger::new();
        ledger.toggle("👍", &user(1));
        ledger.toggle("🔥", &user(2));
        assert!(ledger.reacted_by(&user(2)));
        assert!(!ledger.reacted_by(&user(3)));
        assert_eq!(ledger.entries().count(), 2);
    }
}
