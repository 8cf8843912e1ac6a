//! Post service
//!
//! Handles post creation, listing, views and deletion.

use board_core::{Author, DomainError, Post, Snowflake, TopicRef};
use tracing::{info, instrument};

use crate::dto::{CreatePostRequest, PostResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Default page size for post listings
const DEFAULT_PAGE_SIZE: i64 = 50;

/// Maximum page size for post listings
const MAX_PAGE_SIZE: i64 = 100;

/// Size of the hot list
const HOT_LIST_SIZE: i64 = 20;

/// Post service
pub struct PostService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PostService<'a> {
    /// Create a new PostService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Newest posts, optionally strictly older than `before`
    #[instrument(skip(self))]
    pub async fn list_recent(
        &self,
        before: Option<Snowflake>,
        limit: Option<i64>,
    ) -> ServiceResult<Vec<PostResponse>> {
        let posts = self
            .ctx
            .post_repo()
            .list_recent(before, page_size(limit))
            .await?;
        Ok(posts.iter().map(PostResponse::from).collect())
    }

    /// Hottest posts
    #[instrument(skip(self))]
    pub async fn list_hot(&self) -> ServiceResult<Vec<PostResponse>> {
        let posts = self.ctx.post_repo().list_hot(HOT_LIST_SIZE).await?;
        Ok(posts.iter().map(PostResponse::from).collect())
    }

    /// Get post by ID
    #[instrument(skip(self))]
    pub async fn get_post(&self, post_id: Snowflake) -> ServiceResult<PostResponse> {
        let post = self
            .ctx
            .post_repo()
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))?;
        Ok(PostResponse::from(&post))
    }

    /// Posts written by a user, newest first
    #[instrument(skip(self))]
    pub async fn list_by_author(
        &self,
        author_id: Snowflake,
        limit: Option<i64>,
    ) -> ServiceResult<Vec<PostResponse>> {
        let posts = self
            .ctx
            .post_repo()
            .find_by_author(author_id, page_size(limit))
            .await?;
        Ok(posts.iter().map(PostResponse::from).collect())
    }

    /// Create a post and hand it to the persona agent
    #[instrument(skip(self, author, request), fields(author = %author.name))]
    pub async fn create_post(
        &self,
        author: Author,
        request: CreatePostRequest,
    ) -> ServiceResult<PostResponse> {
        let topics = self.resolve_topics(&request.topics).await?;

        let post = Post::new(
            self.ctx.generate_id(),
            request.title.trim().to_string(),
            request.content,
            author,
            topics,
            request.images,
        )?;

        self.ctx.post_repo().create(&post).await?;

        info!(post_id = %post.id, topics = post.topics.len(), "Post created");

        if let Some(agent) = self.ctx.agent() {
            agent.react_to_post(post.clone());
        }

        Ok(PostResponse::from(&post))
    }

    /// Record one view, returning the new counter
    #[instrument(skip(self))]
    pub async fn record_view(&self, post_id: Snowflake) -> ServiceResult<i64> {
        let views = self
            .ctx
            .post_repo()
            .increment_views(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))?;
        Ok(views)
    }

    /// Delete a post with its comments (author or admin only)
    #[instrument(skip(self))]
    pub async fn delete_post(&self, post_id: Snowflake, caller_id: Snowflake) -> ServiceResult<()> {
        let post = self
            .ctx
            .post_repo()
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))?;

        if !self.may_moderate(caller_id, &post.author).await? {
            return Err(DomainError::NotAuthorOrAdmin("delete this post").into());
        }

        if !self.ctx.post_repo().delete(post_id).await? {
            return Err(DomainError::PostNotFound(post_id).into());
        }

        info!(post_id = %post_id, deleted_by = %caller_id, "Post deleted");

        Ok(())
    }

    // === Helper Methods ===

    /// Look up the requested topics, keeping request order
    async fn resolve_topics(&self, ids: &[Snowflake]) -> ServiceResult<Vec<TopicRef>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut unique: Vec<Snowflake> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }

        let found = self.ctx.topic_repo().find_by_ids(&unique).await?;
        unique
            .into_iter()
            .map(|id| {
                found
                    .iter()
                    .find(|t| t.id == id)
                    .map(|t| TopicRef {
                        id: t.id,
                        name: t.name.clone(),
                    })
                    .ok_or_else(|| ServiceError::from(DomainError::TopicNotFound(id)))
            })
            .collect()
    }

    /// The author, or an admin
    async fn may_moderate(&self, caller_id: Snowflake, author: &Author) -> ServiceResult<bool> {
        if author.is_user(caller_id) {
            return Ok(true);
        }
        let caller = self.ctx.user_repo().find_by_id(caller_id).await?;
        Ok(caller.is_some_and(|u| u.can_moderate(author)))
    }
}

fn page_size(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}
