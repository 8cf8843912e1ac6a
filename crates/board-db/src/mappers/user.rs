//! User entity <-> model mapper

use board_core::entities::{User, UserRole};
use board_core::value_objects::Snowflake;

use crate::models::UserModel;

fn ids(raw: Vec<i64>) -> Vec<Snowflake> {
    raw.into_iter().map(Snowflake::new).collect()
}

/// Convert UserModel to User entity
impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            name: model.name,
            avatar: model.avatar,
            bio: model.bio,
            role: UserRole::parse(&model.role),
            last_read_interactions: model.last_read_interactions,
            following_users: ids(model.following_users),
            followers: ids(model.followers),
            followed_posts: ids(model.followed_posts),
            followed_topics: ids(model.followed_topics),
            created_at: model.created_at,
        }
    }
}

/// Profile values written by an upsert; follow lists are never overwritten
pub struct UserUpsert<'a> {
    pub id: i64,
    pub name: &'a str,
    pub avatar: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub role: &'static str,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl<'a> UserUpsert<'a> {
    pub fn new(user: &'a User) -> Self {
        Self {
            id: user.id.into_inner(),
            name: &user.name,
            avatar: user.avatar.as_deref(),
            bio: user.bio.as_deref(),
            role: user.role.as_str(),
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_model_to_entity() {
        let model = UserModel {
            id: 1,
            name: "root".to_string(),
            avatar: None,
            bio: None,
            role: "admin".to_string(),
            last_read_interactions: None,
            following_users: vec![2],
            followers: vec![],
            followed_posts: vec![10, 11],
            followed_topics: vec![],
            created_at: Utc::now(),
        };
        let user = User::from(model);
        assert!(user.is_admin());
        assert_eq!(user.following_users, vec![Snowflake::new(2)]);
        assert_eq!(user.followed_posts.len(), 2);
    }
}
