//! Repository traits

mod repositories;

pub use repositories::{
    CommentRepository, FollowRepository, PostRepository, RepoResult, TopicRepository,
    UserRepository,
};
