//! Discovery service
//!
//! Composes a user's personal feed from three interest streams: posts by
//! followed users, top-level comments by followed users or on followed posts,
//! and posts tagged with followed topics.

use board_core::{
    clamp_feed_limit, merge_feed, FeedContent, FeedCursor, FeedEntry, FeedPage, FeedReason,
    Snowflake,
};
use tracing::{debug, instrument};

use crate::dto::FeedResponse;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Discovery service
pub struct DiscoveryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> DiscoveryService<'a> {
    /// Create a new DiscoveryService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// One page of the user's feed, strictly older than `cursor`
    #[instrument(skip(self))]
    pub async fn compose_feed(
        &self,
        user_id: Snowflake,
        cursor: Option<&str>,
        limit: Option<i64>,
    ) -> ServiceResult<FeedResponse> {
        let cursor = cursor
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::parse::<FeedCursor>)
            .transpose()?;
        let limit = clamp_feed_limit(limit);

        let Some(user) = self.ctx.user_repo().find_by_id(user_id).await? else {
            return Ok(FeedResponse::from(FeedPage {
                items: Vec::new(),
                next_cursor: None,
            }));
        };

        let (author_posts, comments, topic_posts) = futures::try_join!(
            self.ctx
                .post_repo()
                .feed_by_authors(&user.following_users, cursor.as_ref(), limit),
            self.ctx.comment_repo().feed_comments(
                &user.following_users,
                &user.followed_posts,
                cursor.as_ref(),
                limit,
            ),
            self.ctx
                .post_repo()
                .feed_by_topics(&user.followed_topics, cursor.as_ref(), limit),
        )?;

        debug!(
            user_id = %user_id,
            author_posts = author_posts.len(),
            comments = comments.len(),
            topic_posts = topic_posts.len(),
            "Feed streams fetched"
        );

        let entries = author_posts
            .into_iter()
            .map(|p| FeedEntry::new(FeedContent::Post(p), FeedReason::FollowingUser))
            .chain(comments.into_iter().map(|c| {
                let reason = if c.author.id.is_some_and(|id| user.following_users.contains(&id)) {
                    FeedReason::FollowingUser
                } else {
                    FeedReason::FollowedPost
                };
                FeedEntry::new(FeedContent::Reply(c), reason)
            }))
            .chain(
                topic_posts
                    .into_iter()
                    .map(|p| FeedEntry::new(FeedContent::Post(p), FeedReason::FollowingTopic)),
            );

        let page = merge_feed(entries, usize::try_from(limit).unwrap_or_default());
        Ok(FeedResponse::from(page))
    }
}
