//! PostgreSQL implementation of PostRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use board_core::entities::{Post, ReactionLedger};
use board_core::feed::FeedCursor;
use board_core::traits::{PostRepository, RepoResult};
use board_core::value_objects::{ActorKey, Snowflake};

use crate::mappers::PostInsert;
use crate::models::PostModel;

use super::error::map_db_error;
use super::ledger::{self, LedgerTable};

/// Shared projection; the comment count is derived on every read
macro_rules! post_select {
    () => {
        r#"
        SELECT p.id, p.title, p.body, p.author_id, p.author_name, p.author_avatar,
               p.topics, p.images, p.reactions, p.followers, p.views,
               (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count,
               p.created_at
        FROM posts p
        "#
    };
}

fn to_ids(ids: &[Snowflake]) -> Vec<i64> {
    ids.iter().map(|id| id.into_inner()).collect()
}

/// PostgreSQL implementation of PostRepository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    /// Create a new PgPostRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Post>> {
        let result = sqlx::query_as::<_, PostModel>(concat!(post_select!(), "WHERE p.id = $1"))
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Post::from))
    }

    #[instrument(skip(self))]
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Post>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = sqlx::query_as::<_, PostModel>(concat!(
            post_select!(),
            "WHERE p.id = ANY($1) ORDER BY p.created_at DESC, p.id DESC"
        ))
        .bind(to_ids(ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_recent(&self, before: Option<Snowflake>, limit: i64) -> RepoResult<Vec<Post>> {
        let results = sqlx::query_as::<_, PostModel>(concat!(
            post_select!(),
            r#"
            WHERE ($1::BIGINT IS NULL OR p.id < $1)
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $2
            "#
        ))
        .bind(before.map(Snowflake::into_inner))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_hot(&self, limit: i64) -> RepoResult<Vec<Post>> {
        let results = sqlx::query_as::<_, PostModel>(concat!(
            post_select!(),
            r#"
            ORDER BY (
                p.views + p.reaction_count + cardinality(p.followers)
                + 5 * (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id)
            ) DESC, p.id DESC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_author(&self, author_id: Snowflake, limit: i64) -> RepoResult<Vec<Post>> {
        let results = sqlx::query_as::<_, PostModel>(concat!(
            post_select!(),
            "WHERE p.author_id = $1 ORDER BY p.created_at DESC, p.id DESC LIMIT $2"
        ))
        .bind(author_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_reacted_by_author(&self, author_id: Snowflake, limit: i64) -> RepoResult<Vec<Post>> {
        let results = sqlx::query_as::<_, PostModel>(concat!(
            post_select!(),
            r#"
            WHERE p.author_id = $1 AND p.reaction_count > 0
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $2
            "#
        ))
        .bind(author_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_topic(
        &self,
        topic_id: Snowflake,
        before: Option<Snowflake>,
        limit: i64,
    ) -> RepoResult<Vec<Post>> {
        let results = sqlx::query_as::<_, PostModel>(concat!(
            post_select!(),
            r#"
            WHERE $1 = ANY(p.topic_ids) AND ($2::BIGINT IS NULL OR p.id < $2)
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $3
            "#
        ))
        .bind(topic_id.into_inner())
        .bind(before.map(Snowflake::into_inner))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self, post), fields(post_id = %post.id))]
    async fn create(&self, post: &Post) -> RepoResult<()> {
        let insert = PostInsert::new(post);

        sqlx::query(
            r#"
            INSERT INTO posts (
                id, title, body, author_id, author_name, author_avatar,
                topic_ids, topics, images, reactions, reaction_count, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(insert.id)
        .bind(insert.title)
        .bind(insert.body)
        .bind(insert.author_id)
        .bind(insert.author_name)
        .bind(insert.author_avatar)
        .bind(insert.topic_ids)
        .bind(insert.topics)
        .bind(insert.images)
        .bind(insert.reactions)
        .bind(insert.reaction_count)
        .bind(insert.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r#"
            UPDATE users SET followed_posts = array_remove(followed_posts, $1)
            WHERE $1 = ANY(followed_posts)
            "#,
        )
        .bind(id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        // Comments go with the post through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn increment_views(&self, id: Snowflake) -> RepoResult<Option<i64>> {
        sqlx::query_scalar::<_, i64>("UPDATE posts SET views = views + 1 WHERE id = $1 RETURNING views")
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn feed_by_authors(
        &self,
        author_ids: &[Snowflake],
        cursor: Option<&FeedCursor>,
        limit: i64,
    ) -> RepoResult<Vec<Post>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = sqlx::query_as::<_, PostModel>(concat!(
            post_select!(),
            r#"
            WHERE p.author_id = ANY($1)
              AND ($2::TIMESTAMPTZ IS NULL OR p.created_at < $2 OR (p.created_at = $2 AND p.id < $3))
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $4
            "#
        ))
        .bind(to_ids(author_ids))
        .bind(cursor.map(|c| c.created_at))
        .bind(cursor.map_or(i64::MAX, FeedCursor::id_bound))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self))]
    async fn feed_by_topics(
        &self,
        topic_ids: &[Snowflake],
        cursor: Option<&FeedCursor>,
        limit: i64,
    ) -> RepoResult<Vec<Post>> {
        if topic_ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = sqlx::query_as::<_, PostModel>(concat!(
            post_select!(),
            r#"
            WHERE p.topic_ids && $1
              AND ($2::TIMESTAMPTZ IS NULL OR p.created_at < $2 OR (p.created_at = $2 AND p.id < $3))
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $4
            "#
        ))
        .bind(to_ids(topic_ids))
        .bind(cursor.map(|c| c.created_at))
        .bind(cursor.map_or(i64::MAX, FeedCursor::id_bound))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self))]
    async fn toggle_reaction(
        &self,
        id: Snowflake,
        emoji: &str,
        actor: &ActorKey,
    ) -> RepoResult<Option<ReactionLedger>> {
        ledger::toggle(&self.pool, LedgerTable::Posts, id, emoji, actor).await
    }

    #[instrument(skip(self))]
    async fn reacted_by(&self, actor: &ActorKey, limit: i64) -> RepoResult<Vec<Post>> {
        let results = sqlx::query_as::<_, PostModel>(concat!(
            post_select!(),
            r#"
            WHERE p.reaction_count > 0
              AND EXISTS (SELECT 1 FROM jsonb_each(p.reactions) e WHERE e.value ? $1)
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $2
            "#
        ))
        .bind(actor.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Post::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgPostRepository>();
    }

    #[test]
    fn test_projection_reads_comment_count() {
        let sql = concat!(post_select!(), "WHERE p.id = $1");
        assert!(sql.contains("AS comment_count"));
        assert!(sql.trim_end().ends_with("WHERE p.id = $1"));
    }
}
