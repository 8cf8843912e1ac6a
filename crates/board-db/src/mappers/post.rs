//! Post entity <-> model mapper

use board_core::entities::{Post, ReactionLedger, TopicRef};
use board_core::value_objects::{Author, Snowflake};
use sqlx::types::Json;

use crate::models::PostModel;

/// Convert PostModel to Post entity
impl From<PostModel> for Post {
    fn from(model: PostModel) -> Self {
        Post {
            id: Snowflake::new(model.id),
            title: model.title,
            body: model.body,
            author: Author {
                id: model.author_id.map(Snowflake::new),
                name: model.author_name,
                avatar: model.author_avatar,
            },
            topics: model.topics.0,
            images: model.images,
            reactions: model.reactions.0.normalized(),
            followers: model.followers.into_iter().map(Snowflake::new).collect(),
            views: model.views,
            comment_count: model.comment_count,
            created_at: model.created_at,
        }
    }
}

/// Post entity values for database insertion
pub struct PostInsert<'a> {
    pub id: i64,
    pub title: &'a str,
    pub body: &'a str,
    pub author_id: Option<i64>,
    pub author_name: &'a str,
    pub author_avatar: Option<&'a str>,
    pub topic_ids: Vec<i64>,
    pub topics: Json<&'a [TopicRef]>,
    pub images: &'a [String],
    pub reactions: Json<&'a ReactionLedger>,
    pub reaction_count: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl<'a> PostInsert<'a> {
    pub fn new(post: &'a Post) -> Self {
        Self {
            id: post.id.into_inner(),
            title: &post.title,
            body: &post.body,
            author_id: post.author.id.map(Snowflake::into_inner),
            author_name: &post.author.name,
            author_avatar: post.author.avatar.as_deref(),
            topic_ids: post.topics.iter().map(|t| t.id.into_inner()).collect(),
            topics: Json(&post.topics),
            images: &post.images,
            reactions: Json(&post.reactions),
            reaction_count: post.reaction_count() as i32,
            created_at: post.created_at,
        }
    }
}
