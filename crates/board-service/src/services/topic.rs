//! Topic service
//!
//! Handles topic creation, listing and deletion, and a topic's posts.

use board_core::{DomainError, Snowflake, Topic};
use tracing::{info, instrument};

use crate::dto::{CreateTopicRequest, PostResponse, TopicResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Default page size for a topic's posts
const DEFAULT_PAGE_SIZE: i64 = 50;

/// Maximum page size for a topic's posts
const MAX_PAGE_SIZE: i64 = 100;

/// Topic service
pub struct TopicService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TopicService<'a> {
    /// Create a new TopicService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// All topics, by name
    #[instrument(skip(self))]
    pub async fn list_topics(&self) -> ServiceResult<Vec<TopicResponse>> {
        let topics = self.ctx.topic_repo().list_all().await?;
        Ok(topics.iter().map(TopicResponse::from).collect())
    }

    /// Get topic by ID
    #[instrument(skip(self))]
    pub async fn get_topic(&self, topic_id: Snowflake) -> ServiceResult<TopicResponse> {
        let topic = self
            .ctx
            .topic_repo()
            .find_by_id(topic_id)
            .await?
            .ok_or(DomainError::TopicNotFound(topic_id))?;
        Ok(TopicResponse::from(&topic))
    }

    /// Create a topic; names are unique regardless of case
    #[instrument(skip(self, request))]
    pub async fn create_topic(
        &self,
        creator_id: Snowflake,
        request: CreateTopicRequest,
    ) -> ServiceResult<TopicResponse> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(DomainError::ValidationError("Topic name must not be blank".into()).into());
        }

        if self.ctx.topic_repo().find_by_name(name).await?.is_some() {
            return Err(DomainError::TopicNameTaken(name.to_string()).into());
        }

        let topic = Topic::new(
            self.ctx.generate_id(),
            name.to_string(),
            request.description.trim().to_string(),
            request.icon,
            Some(creator_id),
        );

        self.ctx.topic_repo().create(&topic).await?;

        info!(topic_id = %topic.id, name = %topic.name, creator_id = %creator_id, "Topic created");

        Ok(TopicResponse::from(&topic))
    }

    /// Delete a topic (creator or admin only)
    #[instrument(skip(self))]
    pub async fn delete_topic(&self, topic_id: Snowflake, caller_id: Snowflake) -> ServiceResult<()> {
        let topic = self
            .ctx
            .topic_repo()
            .find_by_id(topic_id)
            .await?
            .ok_or(DomainError::TopicNotFound(topic_id))?;

        if topic.creator_id != Some(caller_id) {
            let caller = self.ctx.user_repo().find_by_id(caller_id).await?;
            if !caller.is_some_and(|u| u.is_admin()) {
                return Err(DomainError::NotAuthorOrAdmin("delete this topic").into());
            }
        }

        if !self.ctx.topic_repo().delete(topic_id).await? {
            return Err(DomainError::TopicNotFound(topic_id).into());
        }

        info!(topic_id = %topic_id, deleted_by = %caller_id, "Topic deleted");

        Ok(())
    }

    /// Posts tagged with the topic, newest first
    #[instrument(skip(self))]
    pub async fn list_posts(
        &self,
        topic_id: Snowflake,
        before: Option<Snowflake>,
        limit: Option<i64>,
    ) -> ServiceResult<Vec<PostResponse>> {
        if self.ctx.topic_repo().find_by_id(topic_id).await?.is_none() {
            return Err(DomainError::TopicNotFound(topic_id).into());
        }

        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let posts = self
            .ctx
            .post_repo()
            .find_by_topic(topic_id, before, limit)
            .await?;
        Ok(posts.iter().map(PostResponse::from).collect())
    }
}
