//! Reaction service
//!
//! Toggles emoji reactions on posts and comments. The toggle itself runs in
//! the store against the latest ledger; this layer validates input and maps
//! a missing target to `TargetNotFound`.

use board_core::{ActorKey, DomainError, ReactionLedger, ReactionTargetKind, Snowflake};
use tracing::{info, instrument};

use crate::dto::{CommentResponse, PostResponse, ReactRequest, ReactionResponse, UserReactionsResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Maximum number of entries per list on the profile reactions tab
const USER_REACTIONS_LIMIT: i64 = 100;

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new ReactionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add the actor under the emoji, or remove it if already present
    #[instrument(skip(self, request), fields(target_id = %request.target_id, target_type = %request.target_type))]
    pub async fn toggle(&self, actor: &ActorKey, request: ReactRequest) -> ServiceResult<ReactionResponse> {
        let emoji = ReactionLedger::validate_emoji(&request.emoji)?;
        let target_id = request.target_id;

        let ledger = match request.target_type {
            ReactionTargetKind::Post => {
                self.ctx
                    .post_repo()
                    .toggle_reaction(target_id, emoji, actor)
                    .await?
            }
            ReactionTargetKind::Message => {
                self.ctx
                    .comment_repo()
                    .toggle_reaction(target_id, emoji, actor)
                    .await?
            }
        }
        .ok_or(DomainError::TargetNotFound {
            kind: request.target_type,
            id: target_id,
        })?;

        info!(
            target_id = %target_id,
            emoji = %emoji,
            actor = %actor,
            active = ledger.contains(emoji, actor),
            total = ledger.total(),
            "Reaction toggled"
        );

        Ok(ReactionResponse::new(ledger))
    }

    /// Posts and comments a signed-in user has reacted to
    #[instrument(skip(self))]
    pub async fn list_user_reactions(&self, user_id: Snowflake) -> ServiceResult<UserReactionsResponse> {
        let actor = ActorKey::User(user_id);
        let (posts, comments) = futures::try_join!(
            self.ctx.post_repo().reacted_by(&actor, USER_REACTIONS_LIMIT),
            self.ctx.comment_repo().reacted_by(&actor, USER_REACTIONS_LIMIT),
        )?;

        Ok(UserReactionsResponse {
            posts: posts.iter().map(PostResponse::from).collect(),
            messages: comments.iter().map(CommentResponse::from).collect(),
        })
    }
}
