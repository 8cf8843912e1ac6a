//! PostgreSQL implementation of CommentRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use board_core::entities::{Comment, ReactionLedger};
use board_core::feed::FeedCursor;
use board_core::traits::{CommentRepository, RepoResult};
use board_core::value_objects::{ActorKey, ReplyTarget, Snowflake};

use crate::mappers::CommentInsert;
use crate::models::CommentModel;

use super::error::map_db_error;
use super::ledger::{self, LedgerTable};

macro_rules! comment_select {
    () => {
        r#"
        SELECT c.id, c.post_id, c.body, c.author_id, c.author_name, c.author_avatar,
               c.parent_id, c.depth, c.reply_to_id, c.reply_to_name, c.reactions, c.created_at
        FROM comments c
        "#
    };
}

/// PostgreSQL implementation of CommentRepository
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    /// Create a new PgCommentRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Comment>> {
        let result = sqlx::query_as::<_, CommentModel>(concat!(comment_select!(), "WHERE c.id = $1"))
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Comment::from))
    }

    #[instrument(skip(self))]
    async fn find_by_post(&self, post_id: Snowflake) -> RepoResult<Vec<Comment>> {
        let results = sqlx::query_as::<_, CommentModel>(concat!(
            comment_select!(),
            "WHERE c.post_id = $1"
        ))
        .bind(post_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Comment::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_author(&self, author_id: Snowflake, limit: i64) -> RepoResult<Vec<Comment>> {
        let results = sqlx::query_as::<_, CommentModel>(concat!(
            comment_select!(),
            "WHERE c.author_id = $1 ORDER BY c.created_at DESC, c.id DESC LIMIT $2"
        ))
        .bind(author_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Comment::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_reacted_by_author(
        &self,
        author_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<Comment>> {
        let results = sqlx::query_as::<_, CommentModel>(concat!(
            comment_select!(),
            r#"
            WHERE c.author_id = $1 AND c.reaction_count > 0
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $2
            "#
        ))
        .bind(author_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Comment::from).collect())
    }

    #[instrument(skip(self, comment), fields(comment_id = %comment.id, post_id = %comment.post_id))]
    async fn create(&self, comment: &Comment) -> RepoResult<()> {
        let insert = CommentInsert::new(comment);

        sqlx::query(
            r#"
            INSERT INTO comments (
                id, post_id, body, author_id, author_name, author_avatar,
                parent_id, depth, reply_to_id, reply_to_name, reactions, reaction_count, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(insert.id)
        .bind(insert.post_id)
        .bind(insert.body)
        .bind(insert.author_id)
        .bind(insert.author_name)
        .bind(insert.author_avatar)
        .bind(insert.parent_id)
        .bind(insert.depth)
        .bind(insert.reply_to_id)
        .bind(insert.reply_to_name)
        .bind(insert.reactions)
        .bind(insert.reaction_count)
        .bind(insert.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_in_order(&self, ids: &[Snowflake]) -> RepoResult<u64> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        let mut removed = 0;

        for id in ids {
            let result = sqlx::query("DELETE FROM comments WHERE id = $1")
                .bind(id.into_inner())
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
            removed += result.rows_affected();
        }

        tx.commit().await.map_err(map_db_error)?;

        debug!(requested = ids.len(), removed, "Comments deleted");
        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn find_created_after(
        &self,
        after: DateTime<Utc>,
        after_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<Comment>> {
        let results = sqlx::query_as::<_, CommentModel>(concat!(
            comment_select!(),
            r#"
            WHERE c.created_at > $1 OR (c.created_at = $1 AND c.id > $2)
            ORDER BY c.created_at ASC, c.id ASC
            LIMIT $3
            "#
        ))
        .bind(after)
        .bind(after_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Comment::from).collect())
    }

    #[instrument(skip(self))]
    async fn reply_exists(
        &self,
        post_id: Snowflake,
        author_id: Snowflake,
        target: &ReplyTarget,
        after: DateTime<Utc>,
    ) -> RepoResult<bool> {
        // Users are matched by id, anonymous targets by display name
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM comments
                WHERE post_id = $1
                  AND author_id = $2
                  AND created_at >= $3
                  AND (
                      ($4::BIGINT IS NOT NULL AND reply_to_id = $4)
                      OR ($4::BIGINT IS NULL AND reply_to_id IS NULL AND reply_to_name = $5)
                  )
            )
            "#,
        )
        .bind(post_id.into_inner())
        .bind(author_id.into_inner())
        .bind(after)
        .bind(target.id.map(Snowflake::into_inner))
        .bind(&target.name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn count_unread(&self, user_id: Snowflake, since: Option<DateTime<Utc>>) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM comments c
            WHERE ($2::TIMESTAMPTZ IS NULL OR c.created_at > $2)
              AND c.author_id IS DISTINCT FROM $1
              AND (
                  c.reply_to_id = $1
                  OR EXISTS (
                      SELECT 1 FROM posts p WHERE p.id = c.post_id AND p.author_id = $1
                  )
              )
            "#,
        )
        .bind(user_id.into_inner())
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn interaction_replies(&self, user_id: Snowflake, limit: i64) -> RepoResult<Vec<Comment>> {
        let results = sqlx::query_as::<_, CommentModel>(concat!(
            comment_select!(),
            r#"
            WHERE c.author_id IS DISTINCT FROM $1
              AND (
                  c.reply_to_id = $1
                  OR (c.parent_id IS NULL AND EXISTS (
                      SELECT 1 FROM posts p WHERE p.id = c.post_id AND p.author_id = $1
                  ))
              )
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $2
            "#
        ))
        .bind(user_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Comment::from).collect())
    }

    #[instrument(skip(self))]
    async fn feed_comments(
        &self,
        author_ids: &[Snowflake],
        post_ids: &[Snowflake],
        cursor: Option<&FeedCursor>,
        limit: i64,
    ) -> RepoResult<Vec<Comment>> {
        if author_ids.is_empty() && post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let authors: Vec<i64> = author_ids.iter().map(|id| id.into_inner()).collect();
        let posts: Vec<i64> = post_ids.iter().map(|id| id.into_inner()).collect();

        let results = sqlx::query_as::<_, CommentModel>(concat!(
            comment_select!(),
            r#"
            WHERE c.parent_id IS NULL
              AND (c.author_id = ANY($1) OR c.post_id = ANY($2))
              AND ($3::TIMESTAMPTZ IS NULL OR c.created_at < $3 OR (c.created_at = $3 AND c.id < $4))
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $5
            "#
        ))
        .bind(authors)
        .bind(posts)
        .bind(cursor.map(|c| c.created_at))
        .bind(cursor.map_or(i64::MAX, FeedCursor::id_bound))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Comment::from).collect())
    }

    #[instrument(skip(self))]
    async fn toggle_reaction(
        &self,
        id: Snowflake,
        emoji: &str,
        actor: &ActorKey,
    ) -> RepoResult<Option<ReactionLedger>> {
        ledger::toggle(&self.pool, LedgerTable::Comments, id, emoji, actor).await
    }

    #[instrument(skip(self))]
    async fn reacted_by(&self, actor: &ActorKey, limit: i64) -> RepoResult<Vec<Comment>> {
        let results = sqlx::query_as::<_, CommentModel>(concat!(
            comment_select!(),
            r#"
            WHERE c.reaction_count > 0
              AND EXISTS (SELECT 1 FROM jsonb_each(c.reactions) e WHERE e.value ? $1)
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $2
            "#
        ))
        .bind(actor.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Comment::from).collect())
    }
}
