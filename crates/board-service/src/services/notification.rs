//! Notification service
//!
//! Aggregates replies and reactions aimed at a user into an unread counter
//! and an interactions list.

use std::collections::HashMap;

use board_core::{
    excerpt, ActorKey, Comment, DomainError, Post, ReactionLedger, ReactionTargetKind, Snowflake,
    ANONYMOUS_NAME,
};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use tracing::{info, instrument};

use crate::dto::{InteractionKind, InteractionResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Length of the target excerpt in an interaction entry
const EXCERPT_CHARS: usize = 80;

/// Notification service
pub struct NotificationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NotificationService<'a> {
    /// Create a new NotificationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Replies the user has not seen since the last `mark_read`
    #[instrument(skip(self))]
    pub async fn unread_count(&self, user_id: Snowflake) -> ServiceResult<i64> {
        let Some(user) = self.ctx.user_repo().find_by_id(user_id).await? else {
            return Ok(0);
        };
        let count = self
            .ctx
            .comment_repo()
            .count_unread(user_id, user.last_read_interactions)
            .await?;
        Ok(count)
    }

    /// Move the user's read cursor to now
    #[instrument(skip(self))]
    pub async fn mark_read(&self, user_id: Snowflake) -> ServiceResult<()> {
        if !self.ctx.user_repo().set_last_read(user_id, Utc::now()).await? {
            return Err(DomainError::UserNotFound(user_id).into());
        }
        info!(user_id = %user_id, "Interactions marked read");
        Ok(())
    }

    /// Replies and reactions aimed at the user, newest first
    ///
    /// Only the user may read their own list. Reactions carry the creation
    /// time of the reacted content.
    #[instrument(skip(self))]
    pub async fn list_interactions(
        &self,
        viewer_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<InteractionResponse>> {
        if viewer_id != user_id {
            return Err(DomainError::NotOwner("interactions").into());
        }

        let limit = self.ctx.interactions_limit();
        let (replies, reacted_posts, reacted_comments) = futures::try_join!(
            self.ctx.comment_repo().interaction_replies(user_id, limit),
            self.ctx.post_repo().find_reacted_by_author(user_id, limit),
            self.ctx.comment_repo().find_reacted_by_author(user_id, limit),
        )?;

        let own_key = ActorKey::User(user_id).to_string();
        let mut entries = Vec::new();

        entries.extend(self.reply_entries(replies).await?);

        let actors: Vec<&str> = reacted_posts
            .iter()
            .map(|p| &p.reactions)
            .chain(reacted_comments.iter().map(|c| &c.reactions))
            .flat_map(|l| l.entries().map(|(_, actor)| actor))
            .filter(|actor| *actor != own_key)
            .collect();
        let names = self.actor_names(actors.into_iter()).await?;

        let targets = reacted_posts
            .iter()
            .map(ReactedTarget::post)
            .chain(reacted_comments.iter().map(ReactedTarget::comment));
        for target in targets {
            entries.extend(target.entries(&own_key, &names));
        }

        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(entries)
    }

    // === Helper Methods ===

    /// Reply entries, each pointing at what it answers
    async fn reply_entries(&self, replies: Vec<Comment>) -> ServiceResult<Vec<InteractionResponse>> {
        let mut post_ids: Vec<Snowflake> = replies.iter().map(|c| c.post_id).collect();
        post_ids.sort_unstable();
        post_ids.dedup();

        let mut parent_ids: Vec<Snowflake> = replies.iter().filter_map(|c| c.parent_id).collect();
        parent_ids.sort_unstable();
        parent_ids.dedup();

        let comment_repo = self.ctx.comment_repo();
        let (posts, parents) = futures::try_join!(
            self.ctx.post_repo().find_by_ids(&post_ids),
            try_join_all(parent_ids.iter().map(|id| comment_repo.find_by_id(*id))),
        )?;

        let titles: HashMap<Snowflake, &str> = posts.iter().map(|p| (p.id, p.title.as_str())).collect();
        let bodies: HashMap<Snowflake, &str> = parents
            .iter()
            .flatten()
            .map(|c| (c.id, c.body.as_str()))
            .collect();

        Ok(replies
            .into_iter()
            .map(|reply| {
                let (target_type, target_id, target_text) = match reply.parent_id {
                    Some(parent) => (
                        ReactionTargetKind::Message,
                        parent,
                        bodies.get(&parent).copied().unwrap_or_default(),
                    ),
                    None => (
                        ReactionTargetKind::Post,
                        reply.post_id,
                        titles.get(&reply.post_id).copied().unwrap_or_default(),
                    ),
                };
                InteractionResponse {
                    kind: InteractionKind::Reply,
                    actor_id: reply.author.id.map(|id| id.to_string()),
                    actor_name: reply.author.name.clone(),
                    target_type: target_type.as_str(),
                    target_id: target_id.to_string(),
                    post_id: reply.post_id.to_string(),
                    content: reply.body,
                    target_excerpt: excerpt(target_text, EXCERPT_CHARS),
                    created_at: reply.created_at,
                }
            })
            .collect())
    }

    /// Display names of the user actors among `actors`
    async fn actor_names<'s>(
        &self,
        actors: impl Iterator<Item = &'s str>,
    ) -> ServiceResult<HashMap<Snowflake, String>> {
        let mut ids: Vec<Snowflake> = actors.filter_map(|a| ActorKey::from_ledger(a).user_id()).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = self.ctx.user_repo().find_by_ids(&ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u.name)).collect())
    }
}

/// Reacted content, as seen by the interactions list
struct ReactedTarget<'e> {
    kind: ReactionTargetKind,
    id: Snowflake,
    post_id: Snowflake,
    reactions: &'e ReactionLedger,
    text: &'e str,
    created_at: DateTime<Utc>,
}

impl<'e> ReactedTarget<'e> {
    fn post(post: &'e Post) -> Self {
        Self {
            kind: ReactionTargetKind::Post,
            id: post.id,
            post_id: post.id,
            reactions: &post.reactions,
            text: &post.title,
            created_at: post.created_at,
        }
    }

    fn comment(comment: &'e Comment) -> Self {
        Self {
            kind: ReactionTargetKind::Message,
            id: comment.id,
            post_id: comment.post_id,
            reactions: &comment.reactions,
            text: &comment.body,
            created_at: comment.created_at,
        }
    }

    /// One entry per (emoji, actor), skipping the owner's own reactions
    fn entries(
        self,
        own_key: &'e str,
        names: &'e HashMap<Snowflake, String>,
    ) -> impl Iterator<Item = InteractionResponse> + 'e {
        let target_excerpt = excerpt(self.text, EXCERPT_CHARS);
        self.reactions
            .entries()
            .filter(move |(_, actor)| *actor != own_key)
            .map(move |(emoji, actor)| {
                let actor_id = ActorKey::from_ledger(actor).user_id();
                let actor_name = actor_id
                    .and_then(|id| names.get(&id).cloned())
                    .unwrap_or_else(|| ANONYMOUS_NAME.to_string());
                InteractionResponse {
                    kind: InteractionKind::Reaction,
                    actor_id: actor_id.map(|id| id.to_string()),
                    actor_name,
                    target_type: self.kind.as_str(),
                    target_id: self.id.to_string(),
                    post_id: self.post_id.to_string(),
                    content: emoji.to_string(),
                    target_excerpt: target_excerpt.clone(),
                    created_at: self.created_at,
                }
            })
    }
}
