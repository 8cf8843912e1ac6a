//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Every mutation that touches a reaction
//! ledger or a follow list is a single read-modify-write executed by the
//! implementation inside one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Comment, Post, ReactionLedger, Topic, User};
use crate::error::DomainError;
use crate::feed::FeedCursor;
use crate::value_objects::{ActorKey, FollowState, FollowTarget, ReplyTarget, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Post Repository
// ============================================================================

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find post by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Post>>;

    /// Find several posts, newest first; unknown ids are skipped
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Post>>;

    /// Newest posts, optionally strictly older than `before`
    async fn list_recent(&self, before: Option<Snowflake>, limit: i64) -> RepoResult<Vec<Post>>;

    /// Posts ordered by heat, highest first
    async fn list_hot(&self, limit: i64) -> RepoResult<Vec<Post>>;

    /// Posts written by a user, newest first
    async fn find_by_author(&self, author_id: Snowflake, limit: i64) -> RepoResult<Vec<Post>>;

    /// Posts written by a user that carry at least one reaction, newest first
    async fn find_reacted_by_author(&self, author_id: Snowflake, limit: i64) -> RepoResult<Vec<Post>>;

    /// Posts tagged with a topic, newest first
    async fn find_by_topic(
        &self,
        topic_id: Snowflake,
        before: Option<Snowflake>,
        limit: i64,
    ) -> RepoResult<Vec<Post>>;

    /// Create a new post
    async fn create(&self, post: &Post) -> RepoResult<()>;

    /// Delete a post with its comments and follow edges; `false` if it did not exist
    async fn delete(&self, id: Snowflake) -> RepoResult<bool>;

    /// Bump the view counter, returning the new value
    async fn increment_views(&self, id: Snowflake) -> RepoResult<Option<i64>>;

    /// Feed stream: posts by any of `author_ids` older than the cursor
    async fn feed_by_authors(
        &self,
        author_ids: &[Snowflake],
        cursor: Option<&FeedCursor>,
        limit: i64,
    ) -> RepoResult<Vec<Post>>;

    /// Feed stream: posts tagged with any of `topic_ids` older than the cursor
    async fn feed_by_topics(
        &self,
        topic_ids: &[Snowflake],
        cursor: Option<&FeedCursor>,
        limit: i64,
    ) -> RepoResult<Vec<Post>>;

    /// Toggle `actor` under `emoji` against the latest stored ledger
    ///
    /// Returns `None` when the post does not exist.
    async fn toggle_reaction(
        &self,
        id: Snowflake,
        emoji: &str,
        actor: &ActorKey,
    ) -> RepoResult<Option<ReactionLedger>>;

    /// Posts the actor has reacted to, newest first
    async fn reacted_by(&self, actor: &ActorKey, limit: i64) -> RepoResult<Vec<Post>>;
}

// ============================================================================
// Comment Repository
// ============================================================================

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Find comment by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Comment>>;

    /// Every comment on a post, in no particular order
    async fn find_by_post(&self, post_id: Snowflake) -> RepoResult<Vec<Comment>>;

    /// Comments written by a user, newest first
    async fn find_by_author(&self, author_id: Snowflake, limit: i64) -> RepoResult<Vec<Comment>>;

    /// Comments written by a user that carry at least one reaction, newest first
    async fn find_reacted_by_author(&self, author_id: Snowflake, limit: i64) -> RepoResult<Vec<Comment>>;

    /// Create a new comment
    async fn create(&self, comment: &Comment) -> RepoResult<()>;

    /// Delete the given comments in order, all or nothing
    async fn delete_in_order(&self, ids: &[Snowflake]) -> RepoResult<u64>;

    /// Comments positioned strictly after `(after, after_id)`, oldest first
    ///
    /// Ordered by creation time then id, so comments sharing a timestamp can
    /// be paged through without gaps.
    async fn find_created_after(
        &self,
        after: DateTime<Utc>,
        after_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<Comment>>;

    /// Whether `author_id` already replied on `post_id` to `target` after `after`
    async fn reply_exists(
        &self,
        post_id: Snowflake,
        author_id: Snowflake,
        target: &ReplyTarget,
        after: DateTime<Utc>,
    ) -> RepoResult<bool>;

    /// Replies a user has not seen: comments after `since` (all when `None`),
    /// not written by the user, addressed to them or on one of their posts
    async fn count_unread(&self, user_id: Snowflake, since: Option<DateTime<Utc>>) -> RepoResult<i64>;

    /// Top-level comments on the user's posts and nested comments addressed
    /// to the user, excluding the user's own, newest first
    async fn interaction_replies(&self, user_id: Snowflake, limit: i64) -> RepoResult<Vec<Comment>>;

    /// Feed stream: top-level comments by `author_ids` or on `post_ids`
    async fn feed_comments(
        &self,
        author_ids: &[Snowflake],
        post_ids: &[Snowflake],
        cursor: Option<&FeedCursor>,
        limit: i64,
    ) -> RepoResult<Vec<Comment>>;

    /// Toggle `actor` under `emoji` against the latest stored ledger
    ///
    /// Returns `None` when the comment does not exist.
    async fn toggle_reaction(
        &self,
        id: Snowflake,
        emoji: &str,
        actor: &ActorKey,
    ) -> RepoResult<Option<ReactionLedger>>;

    /// Comments the actor has reacted to, newest first
    async fn reacted_by(&self, actor: &ActorKey, limit: i64) -> RepoResult<Vec<Comment>>;
}

// ============================================================================
// Topic Repository
// ============================================================================

#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Find topic by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Topic>>;

    /// Find topic by its unique name
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Topic>>;

    /// Find several topics; unknown ids are skipped
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Topic>>;

    /// All topics, by name
    async fn list_all(&self) -> RepoResult<Vec<Topic>>;

    /// Create a topic; a taken name is a `TopicNameTaken` error
    async fn create(&self, topic: &Topic) -> RepoResult<()>;

    /// Delete a topic and strip it from posts and followers
    async fn delete(&self, id: Snowflake) -> RepoResult<bool>;
}

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Find several users; unknown ids are skipped
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<User>>;

    /// Insert the user, or refresh name, avatar and bio of an existing one
    async fn upsert_profile(&self, user: &User) -> RepoResult<()>;

    /// Move the notification cursor
    async fn set_last_read(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<bool>;
}

// ============================================================================
// Follow Repository
// ============================================================================

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Flip the follow edge, updating both sides together
    ///
    /// Returns `None` when the follower or the target does not exist.
    async fn toggle(&self, follower_id: Snowflake, target: FollowTarget) -> RepoResult<Option<FollowState>>;

    /// Current edge state; `None` when the target does not exist
    async fn state(&self, follower_id: Snowflake, target: FollowTarget) -> RepoResult<Option<FollowState>>;
}
