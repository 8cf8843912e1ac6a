//! PostgreSQL implementation of FollowRepository
//!
//! A follow edge is stored on both sides: the follower's list column and the
//! target's `followers` array. Both are rewritten in one transaction with the
//! involved rows locked, so the two sides never disagree.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use board_core::traits::{FollowRepository, RepoResult};
use board_core::value_objects::{FollowState, FollowTarget, Snowflake};

use super::error::map_db_error;

/// Table holding the target and the follower-side list column for it
fn columns(target: FollowTarget) -> (&'static str, &'static str) {
    match target {
        FollowTarget::User(_) => ("users", "following_users"),
        FollowTarget::Post(_) => ("posts", "followed_posts"),
        FollowTarget::Topic(_) => ("topics", "followed_topics"),
    }
}

/// PostgreSQL implementation of FollowRepository
#[derive(Clone)]
pub struct PgFollowRepository {
    pool: PgPool,
}

impl PgFollowRepository {
    /// Create a new PgFollowRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock the user rows involved, in id order so concurrent toggles cannot deadlock
    async fn lock_users(
        tx: &mut Transaction<'_, Postgres>,
        follower_id: Snowflake,
        target: FollowTarget,
    ) -> RepoResult<bool> {
        let mut ids = vec![follower_id.into_inner()];
        if let FollowTarget::User(id) = target {
            ids.push(id.into_inner());
        }
        ids.sort_unstable();
        ids.dedup();

        let locked = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM users WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&ids)
        .fetch_all(&mut **tx)
        .await
        .map_err(map_db_error)?;

        Ok(locked.len() == ids.len())
    }
}

#[async_trait]
impl FollowRepository for PgFollowRepository {
    #[instrument(skip(self))]
    async fn toggle(
        &self,
        follower_id: Snowflake,
        target: FollowTarget,
    ) -> RepoResult<Option<FollowState>> {
        let (table, list) = columns(target);
        let target_id = target.id().into_inner();
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        if !Self::lock_users(&mut tx, follower_id, target).await? {
            return Ok(None);
        }

        if !matches!(target, FollowTarget::User(_)) {
            let lock = format!("SELECT id FROM {table} WHERE id = $1 FOR UPDATE");
            let found = sqlx::query_scalar::<_, i64>(&lock)
                .bind(target_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_db_error)?;
            if found.is_none() {
                return Ok(None);
            }
        }

        let check = format!("SELECT $2 = ANY({list}) FROM users WHERE id = $1");
        let was_following = sqlx::query_scalar::<_, bool>(&check)
            .bind(follower_id.into_inner())
            .bind(target_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let (follower_side, target_side) = if was_following {
            (
                format!("UPDATE users SET {list} = array_remove({list}, $2) WHERE id = $1"),
                format!("UPDATE {table} SET followers = array_remove(followers, $2) WHERE id = $1"),
            )
        } else {
            (
                format!(
                    "UPDATE users SET {list} = array_append(array_remove({list}, $2), $2) WHERE id = $1"
                ),
                format!(
                    "UPDATE {table} SET followers = array_append(array_remove(followers, $2), $2) WHERE id = $1"
                ),
            )
        };

        sqlx::query(&follower_side)
            .bind(follower_id.into_inner())
            .bind(target_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query(&target_side)
            .bind(target_id)
            .bind(follower_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let count = format!("SELECT cardinality(followers)::BIGINT FROM {table} WHERE id = $1");
        let follower_count = sqlx::query_scalar::<_, i64>(&count)
            .bind(target_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        let state = FollowState {
            following: !was_following,
            follower_count,
        };
        debug!(%follower_id, %target, following = state.following, "Follow toggled");
        Ok(Some(state))
    }

    #[instrument(skip(self))]
    async fn state(
        &self,
        follower_id: Snowflake,
        target: FollowTarget,
    ) -> RepoResult<Option<FollowState>> {
        let (table, _) = columns(target);

        let query = format!(
            r#"
            SELECT $2 = ANY(followers), cardinality(followers)::BIGINT
            FROM {table}
            WHERE id = $1
            "#
        );
        let row = sqlx::query_as::<_, (bool, i64)>(&query)
            .bind(target.id().into_inner())
            .bind(follower_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.map(|(following, follower_count)| FollowState {
            following,
            follower_count,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgFollowRepository>();
    }

    #[test]
    fn test_columns_per_target() {
        let id = Snowflake::new(1);
        assert_eq!(columns(FollowTarget::User(id)), ("users", "following_users"));
        assert_eq!(columns(FollowTarget::Post(id)), ("posts", "followed_posts"));
        assert_eq!(columns(FollowTarget::Topic(id)), ("topics", "followed_topics"));
    }
}
