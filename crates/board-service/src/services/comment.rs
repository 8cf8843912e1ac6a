//! Comment service
//!
//! Handles threaded comments ("messages") on posts: creation under the depth
//! limit, tree listing and cascading deletion.

use board_core::{Author, Comment, CommentTree, DomainError, Snowflake, SortMode};
use tracing::{info, instrument};

use crate::dto::{CommentResponse, CreateCommentRequest, ThreadResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Maximum number of replies on a profile page
const USER_REPLIES_LIMIT: i64 = 100;

/// Comment service
pub struct CommentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CommentService<'a> {
    /// Create a new CommentService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a comment on a post, optionally under a parent comment
    #[instrument(skip(self, author, request), fields(author = %author.name))]
    pub async fn create_comment(
        &self,
        post_id: Snowflake,
        author: Author,
        request: CreateCommentRequest,
    ) -> ServiceResult<CommentResponse> {
        if self.ctx.post_repo().find_by_id(post_id).await?.is_none() {
            return Err(DomainError::PostNotFound(post_id).into());
        }

        let id = self.ctx.generate_id();
        let comment = match request.parent_id {
            Some(parent_id) => {
                let parent = self
                    .ctx
                    .comment_repo()
                    .find_by_id(parent_id)
                    .await?
                    .ok_or(DomainError::ParentNotFound(parent_id))?;
                Comment::new_reply(id, post_id, request.content, author, &parent)?
            }
            None => Comment::new_root(id, post_id, request.content, author),
        };

        self.ctx.comment_repo().create(&comment).await?;

        info!(
            comment_id = %comment.id,
            post_id = %post_id,
            depth = comment.depth,
            "Comment created"
        );

        Ok(CommentResponse::from(&comment))
    }

    /// The post's comments as nested threads
    ///
    /// `sort` orders the top level only; replies are always chronological.
    #[instrument(skip(self))]
    pub async fn list_threaded(
        &self,
        post_id: Snowflake,
        sort: Option<&str>,
        author_filter: Option<&str>,
    ) -> ServiceResult<Vec<ThreadResponse>> {
        let sort = match sort.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => s.parse::<SortMode>()?,
            None => SortMode::default(),
        };

        if self.ctx.post_repo().find_by_id(post_id).await?.is_none() {
            return Err(DomainError::PostNotFound(post_id).into());
        }

        let comments = self.ctx.comment_repo().find_by_post(post_id).await?;
        let filter = author_filter.map(str::trim).filter(|f| !f.is_empty());

        Ok(CommentTree::build(comments)
            .into_threads(sort, filter)
            .into_iter()
            .map(ThreadResponse::from)
            .collect())
    }

    /// Delete a comment and every reply below it (author or admin only)
    ///
    /// Returns the number of removed comments.
    #[instrument(skip(self))]
    pub async fn delete_comment(&self, comment_id: Snowflake, caller_id: Snowflake) -> ServiceResult<u64> {
        let comment = self
            .ctx
            .comment_repo()
            .find_by_id(comment_id)
            .await?
            .ok_or(DomainError::CommentNotFound(comment_id))?;

        if !comment.author.is_user(caller_id) {
            let caller = self.ctx.user_repo().find_by_id(caller_id).await?;
            if !caller.is_some_and(|u| u.can_moderate(&comment.author)) {
                return Err(DomainError::NotAuthorOrAdmin("delete this comment").into());
            }
        }

        let tree = CommentTree::build(self.ctx.comment_repo().find_by_post(comment.post_id).await?);
        let order = tree
            .deletion_order(comment_id)
            .unwrap_or_else(|| vec![comment_id]);

        let removed = self.ctx.comment_repo().delete_in_order(&order).await?;

        info!(
            comment_id = %comment_id,
            post_id = %comment.post_id,
            removed = removed,
            deleted_by = %caller_id,
            "Comment deleted"
        );

        Ok(removed)
    }

    /// Comments written by a user, newest first
    #[instrument(skip(self))]
    pub async fn list_user_replies(&self, user_id: Snowflake) -> ServiceResult<Vec<CommentResponse>> {
        let comments = self
            .ctx
            .comment_repo()
            .find_by_author(user_id, USER_REPLIES_LIMIT)
            .await?;
        Ok(comments.iter().map(CommentResponse::from).collect())
    }
}
