//! Row-locked reaction toggle shared by posts and comments

use board_core::entities::ReactionLedger;
use board_core::traits::RepoResult;
use board_core::value_objects::{ActorKey, Snowflake};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;

use super::error::map_db_error;

/// Tables that carry a `reactions` ledger column
#[derive(Debug, Clone, Copy)]
pub(super) enum LedgerTable {
    Posts,
    Comments,
}

impl LedgerTable {
    fn name(self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Comments => "comments",
        }
    }
}

/// Apply one toggle against the latest stored ledger
///
/// The row is locked with `FOR UPDATE` for the duration of the transaction,
/// so concurrent toggles on the same target serialize instead of
/// overwriting each other.
pub(super) async fn toggle(
    pool: &PgPool,
    table: LedgerTable,
    id: Snowflake,
    emoji: &str,
    actor: &ActorKey,
) -> RepoResult<Option<ReactionLedger>> {
    let mut tx = pool.begin().await.map_err(map_db_error)?;

    let select = format!("SELECT reactions FROM {} WHERE id = $1 FOR UPDATE", table.name());
    let stored = sqlx::query_scalar::<_, Json<ReactionLedger>>(&select)
        .bind(id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

    let Some(Json(ledger)) = stored else {
        return Ok(None);
    };

    let mut ledger = ledger.normalized();
    let change = ledger.toggle(emoji, actor);

    let update = format!(
        "UPDATE {} SET reactions = $2, reaction_count = $3 WHERE id = $1",
        table.name()
    );
    sqlx::query(&update)
        .bind(id.into_inner())
        .bind(Json(&ledger))
        .bind(ledger.total() as i32)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

    tx.commit().await.map_err(map_db_error)?;

    debug!(table = table.name(), id = %id, ?change, "Reaction ledger updated");
    Ok(Some(ledger))
}
