//! PostgreSQL implementation of TopicRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use board_core::entities::Topic;
use board_core::error::DomainError;
use board_core::traits::{RepoResult, TopicRepository};
use board_core::value_objects::Snowflake;

use crate::models::TopicModel;

use super::error::{map_db_error, map_unique_violation};

macro_rules! topic_select {
    () => {
        r#"
        SELECT t.id, t.name, t.description, t.icon, t.creator_id, t.followers,
               (SELECT COUNT(*) FROM posts p WHERE t.id = ANY(p.topic_ids)) AS post_count,
               t.created_at
        FROM topics t
        "#
    };
}

/// PostgreSQL implementation of TopicRepository
#[derive(Clone)]
pub struct PgTopicRepository {
    pool: PgPool,
}

impl PgTopicRepository {
    /// Create a new PgTopicRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TopicRepository for PgTopicRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Topic>> {
        let result = sqlx::query_as::<_, TopicModel>(concat!(topic_select!(), "WHERE t.id = $1"))
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Topic::from))
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Topic>> {
        let result = sqlx::query_as::<_, TopicModel>(concat!(
            topic_select!(),
            "WHERE LOWER(t.name) = LOWER($1)"
        ))
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Topic::from))
    }

    #[instrument(skip(self))]
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Topic>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<i64> = ids.iter().map(|id| id.into_inner()).collect();
        let results = sqlx::query_as::<_, TopicModel>(concat!(
            topic_select!(),
            "WHERE t.id = ANY($1) ORDER BY t.name"
        ))
        .bind(raw)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Topic::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> RepoResult<Vec<Topic>> {
        let results = sqlx::query_as::<_, TopicModel>(concat!(topic_select!(), "ORDER BY t.name"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(Topic::from).collect())
    }

    #[instrument(skip(self, topic), fields(topic_id = %topic.id, name = %topic.name))]
    async fn create(&self, topic: &Topic) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO topics (id, name, description, icon, creator_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(topic.id.into_inner())
        .bind(&topic.name)
        .bind(&topic.description)
        .bind(&topic.icon)
        .bind(topic.creator_id.map(Snowflake::into_inner))
        .bind(topic.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::TopicNameTaken(topic.name.clone())))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Drop the id and the denormalized {id, name} ref from every tagged post
        sqlx::query(
            r#"
            UPDATE posts SET
                topic_ids = array_remove(topic_ids, $1),
                topics = COALESCE(
                    (SELECT jsonb_agg(t) FROM jsonb_array_elements(topics) t WHERE t->>'id' <> $2),
                    '[]'::jsonb
                )
            WHERE $1 = ANY(topic_ids)
            "#,
        )
        .bind(id.into_inner())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r#"
            UPDATE users SET followed_topics = array_remove(followed_topics, $1)
            WHERE $1 = ANY(followed_topics)
            "#,
        )
        .bind(id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let result = sqlx::query("DELETE FROM topics WHERE id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
