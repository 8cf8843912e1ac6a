//! Post entity - a top-level discussion

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reaction::ReactionLedger;
use crate::error::DomainError;
use crate::value_objects::{Author, Snowflake};

/// Maximum number of topics a post may be tagged with
pub const MAX_POST_TOPICS: usize = 3;

/// Weight of one comment in a post's heat score
pub const COMMENT_HEAT_WEIGHT: i64 = 5;

/// Topic reference embedded in a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRef {
    pub id: Snowflake,
    pub name: String,
}

/// Post entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Snowflake,
    pub title: String,
    pub body: String,
    pub author: Author,
    pub topics: Vec<TopicRef>,
    /// Image URLs attached by the upload collaborator
    pub images: Vec<String>,
    pub reactions: ReactionLedger,
    pub followers: Vec<Snowflake>,
    pub views: i64,
    /// Number of comments on the post, loaded with the post
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new Post
    pub fn new(
        id: Snowflake,
        title: String,
        body: String,
        author: Author,
        topics: Vec<TopicRef>,
        images: Vec<String>,
    ) -> Result<Self, DomainError> {
        if topics.len() > MAX_POST_TOPICS {
            return Err(DomainError::TooManyTopics {
                max: MAX_POST_TOPICS,
            });
        }
        Ok(Self {
            id,
            title,
            body,
            author,
            topics,
            images,
            reactions: ReactionLedger::new(),
            followers: Vec::new(),
            views: 0,
            comment_count: 0,
            created_at: super::now_millis(),
        })
    }

    #[inline]
    pub fn reaction_count(&self) -> i64 {
        self.reactions.total()
    }

    #[inline]
    pub fn follower_count(&self) -> i64 {
        self.followers.len() as i64
    }

    /// Engagement score, derived on every read
    pub fn heat(&self) -> i64 {
        self.views + self.reaction_count() + self.follower_count() + COMMENT_HEAT_WEIGHT * self.comment_count
    }

    pub fn has_topic(&self, topic_id: Snowflake) -> bool {
        self.topics.iter().any(|t| t.id == topic_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::ActorKey;

    fn sample() -> Post {
        Post::new(
            Snowflake::new(1),
            "Title".to_string(),
            "Body".to_string(),
            Author::user(Snowflake::new(10), "alice", None),
            vec![],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_heat_combines_signals() {
        let mut post = sample();
        assert_eq!(post.heat(), 0);

        post.views = 4;
        post.reactions.toggle("👍", &ActorKey::User(Snowflake::new(2)));
        post.followers.push(Snowflake::new(3));
        post.comment_count = 2;
        assert_eq!(post.heat(), 4 + 1 + 1 + 10);
    }

    #[test]
    fn test_topic_limit() {
        let topics: Vec<_> = (0..4)
            .map(|i| TopicRef {
                id: Snowflake::new(i),
                name: format!("t{i}"),
            })
            .collect();
        let err = Post::new(
            Snowflake::new(1),
            "t".into(),
            "b".into(),
            Author::anonymous(None),
            topics,
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::TooManyTopics { max: 3 }));
    }
}
