//! Comment entity <-> model mapper

use board_core::entities::{Comment, ReactionLedger};
use board_core::value_objects::{Author, ReplyTarget, Snowflake};
use sqlx::types::Json;

use crate::models::CommentModel;

/// Convert CommentModel to Comment entity
impl From<CommentModel> for Comment {
    fn from(model: CommentModel) -> Self {
        let reply_to = model.reply_to_name.map(|name| ReplyTarget {
            id: model.reply_to_id.map(Snowflake::new),
            name,
        });

        Comment {
            id: Snowflake::new(model.id),
            post_id: Snowflake::new(model.post_id),
            body: model.body,
            author: Author {
                id: model.author_id.map(Snowflake::new),
                name: model.author_name,
                avatar: model.author_avatar,
            },
            parent_id: model.parent_id.map(Snowflake::new),
            depth: model.depth,
            reply_to,
            reactions: model.reactions.0.normalized(),
            created_at: model.created_at,
        }
    }
}

/// Comment entity values for database insertion
pub struct CommentInsert<'a> {
    pub id: i64,
    pub post_id: i64,
    pub body: &'a str,
    pub author_id: Option<i64>,
    pub author_name: &'a str,
    pub author_avatar: Option<&'a str>,
    pub parent_id: Option<i64>,
    pub depth: i32,
    pub reply_to_id: Option<i64>,
    pub reply_to_name: Option<&'a str>,
    pub reactions: Json<&'a ReactionLedger>,
    pub reaction_count: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl<'a> CommentInsert<'a> {
    pub fn new(comment: &'a Comment) -> Self {
        Self {
            id: comment.id.into_inner(),
            post_id: comment.post_id.into_inner(),
            body: &comment.body,
            author_id: comment.author.id.map(Snowflake::into_inner),
            author_name: &comment.author.name,
            author_avatar: comment.author.avatar.as_deref(),
            parent_id: comment.parent_id.map(Snowflake::into_inner),
            depth: comment.depth,
            reply_to_id: comment
                .reply_to
                .as_ref()
                .and_then(|t| t.id)
                .map(Snowflake::into_inner),
            reply_to_name: comment.reply_to.as_ref().map(|t| t.name.as_str()),
            reactions: Json(&comment.reactions),
            reaction_count: comment.reaction_count() as i32,
            created_at: comment.created_at,
        }
    }
}
