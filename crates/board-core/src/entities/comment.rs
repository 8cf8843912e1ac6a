//! Comment entity - a reply inside a post's thread

use chrono::{DateTime, Utc};

use super::reaction::ReactionLedger;
use crate::error::DomainError;
use crate::thread::ReplyPlacement;
use crate::value_objects::{Author, ReplyTarget, Snowflake};

/// Deepest nesting level a stored comment may have
pub const MAX_THREAD_DEPTH: i32 = 3;

/// Comment entity
///
/// `depth == 1` exactly when `parent_id` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Snowflake,
    pub post_id: Snowflake,
    pub body: String,
    pub author: Author,
    pub parent_id: Option<Snowflake>,
    pub depth: i32,
    /// Who this comment addresses
    pub reply_to: Option<ReplyTarget>,
    pub reactions: ReactionLedger,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Create a top-level comment on a post
    pub fn new_root(id: Snowflake, post_id: Snowflake, body: String, author: Author) -> Self {
        Self {
            id,
            post_id,
            body,
            author,
            parent_id: None,
            depth: 1,
            reply_to: None,
            reactions: ReactionLedger::new(),
            created_at: super::now_millis(),
        }
    }

    /// Create a reply under `parent`, addressed to the parent's author
    pub fn new_reply(
        id: Snowflake,
        post_id: Snowflake,
        body: String,
        author: Author,
        parent: &Comment,
    ) -> Result<Self, DomainError> {
        if parent.post_id != post_id {
            return Err(DomainError::ParentNotInPost);
        }
        let depth = parent.depth + 1;
        if depth > MAX_THREAD_DEPTH {
            return Err(DomainError::MaxDepthExceeded {
                max: MAX_THREAD_DEPTH,
            });
        }
        Ok(Self {
            id,
            post_id,
            body,
            author,
            parent_id: Some(parent.id),
            depth,
            reply_to: Some(parent.author.as_reply_target()),
            reactions: ReactionLedger::new(),
            created_at: super::now_millis(),
        })
    }

    /// Create a comment at an already computed placement
    ///
    /// Used for persona replies, whose parent is chosen by the flattening
    /// rule and whose reply target is the author being answered rather than
    /// the parent's author.
    pub fn new_placed(
        id: Snowflake,
        post_id: Snowflake,
        body: String,
        author: Author,
        placement: ReplyPlacement,
        reply_to: ReplyTarget,
    ) -> Self {
        Self {
            id,
            post_id,
            body,
            author,
            parent_id: placement.parent_id,
            depth: placement.depth,
            reply_to: Some(reply_to),
            reactions: ReactionLedger::new(),
            created_at: super::now_millis(),
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    #[inline]
    pub fn reaction_count(&self) -> i64 {
        self.reactions.total()
    }

    /// Whether the comment is addressed to the given user
    pub fn is_addressed_to(&self, user_id: Snowflake) -> bool {
        self.reply_to.as_ref().and_then(|t| t.id) == Some(user_id)
    }

    /// Check the depth/parent invariant
    pub fn has_consistent_depth(&self) -> bool {
        (self.depth == 1) == self.parent_id.is_none() && (1..=MAX_THREAD_DEPTH).contains(&self.depth)
    }

    /// Truncated body for notifications and excerpts
    pub fn preview(&self, max_chars: usize) -> String {
        excerpt(&self.body, max_chars)
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut with an ellipsis
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    let mut chars = text.char_indices();
    match chars.nth(max_chars) {
        Some((end, _)) => format!("{}…", &text[..end]),
        None => text.to_string(),
    }
}
