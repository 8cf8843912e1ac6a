//! Topic model -> entity mapper

use board_core::entities::Topic;
use board_core::value_objects::Snowflake;

use crate::models::TopicModel;

/// Convert TopicModel to Topic entity
impl From<TopicModel> for Topic {
    fn from(model: TopicModel) -> Self {
        Topic {
            id: Snowflake::new(model.id),
            name: model.name,
            description: model.description,
            icon: model.icon,
            creator_id: model.creator_id.map(Snowflake::new),
            followers: model.followers.into_iter().map(Snowflake::new).collect(),
            post_count: model.post_count,
            created_at: model.created_at,
        }
    }
}
