//! Follow service
//!
//! Toggles follow edges between a user and another user, a post or a topic,
//! and lists what a user follows.

use board_core::{DomainError, FollowTarget, Snowflake, User};
use tracing::{info, instrument};

use crate::dto::{FollowResponse, PostResponse, TopicResponse, UserResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Follow service
pub struct FollowService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> FollowService<'a> {
    /// Create a new FollowService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Follow the target, or unfollow it if already followed
    #[instrument(skip(self))]
    pub async fn toggle(&self, follower_id: Snowflake, target: FollowTarget) -> ServiceResult<FollowResponse> {
        if target == FollowTarget::User(follower_id) {
            return Err(DomainError::SelfFollow.into());
        }
        self.require_user(follower_id).await?;

        let state = self
            .ctx
            .follow_repo()
            .toggle(follower_id, target)
            .await?
            .ok_or_else(|| missing_target(target))?;

        info!(
            follower_id = %follower_id,
            target = %target,
            following = state.following,
            "Follow toggled"
        );

        Ok(FollowResponse {
            following: state.following,
            follower_count: state.follower_count,
        })
    }

    /// Whether the caller follows the target, with its follower count
    #[instrument(skip(self))]
    pub async fn state(&self, follower_id: Snowflake, target: FollowTarget) -> ServiceResult<FollowResponse> {
        let state = self
            .ctx
            .follow_repo()
            .state(follower_id, target)
            .await?
            .ok_or_else(|| missing_target(target))?;

        Ok(FollowResponse {
            following: state.following,
            follower_count: state.follower_count,
        })
    }

    /// Users the given user follows
    #[instrument(skip(self))]
    pub async fn following_users(&self, user_id: Snowflake) -> ServiceResult<Vec<UserResponse>> {
        let user = self.require_user(user_id).await?;
        let users = self.ctx.user_repo().find_by_ids(&user.following_users).await?;
        Ok(users.iter().map(UserResponse::from).collect())
    }

    /// Posts the given user follows
    #[instrument(skip(self))]
    pub async fn followed_posts(&self, user_id: Snowflake) -> ServiceResult<Vec<PostResponse>> {
        let user = self.require_user(user_id).await?;
        let posts = self.ctx.post_repo().find_by_ids(&user.followed_posts).await?;
        Ok(posts.iter().map(PostResponse::from).collect())
    }

    /// Topics the given user follows
    #[instrument(skip(self))]
    pub async fn followed_topics(&self, user_id: Snowflake) -> ServiceResult<Vec<TopicResponse>> {
        let user = self.require_user(user_id).await?;
        let topics = self.ctx.topic_repo().find_by_ids(&user.followed_topics).await?;
        Ok(topics.iter().map(TopicResponse::from).collect())
    }

    async fn require_user(&self, user_id: Snowflake) -> ServiceResult<User> {
        Ok(self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?)
    }
}

fn missing_target(target: FollowTarget) -> DomainError {
    match target {
        FollowTarget::User(id) => DomainError::UserNotFound(id),
        FollowTarget::Post(id) => DomainError::PostNotFound(id),
        FollowTarget::Topic(id) => DomainError::TopicNotFound(id),
    }
}
