//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use board_core::{Comment, FeedContent, FeedEntry, FeedPage, Post, ThreadNode, Topic, TopicRef, User};

use super::responses::{
    CommentResponse, FeedItemResponse, FeedResponse, PostResponse, ThreadResponse,
    TopicRefResponse, TopicResponse, UserResponse,
};

// ============================================================================
// Post Mappers
// ============================================================================

impl From<&TopicRef> for TopicRefResponse {
    fn from(topic: &TopicRef) -> Self {
        Self {
            id: topic.id.to_string(),
            name: topic.name.clone(),
        }
    }
}

impl From<&Post> for PostResponse {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            content: post.body.clone(),
            author: post.author.name.clone(),
            author_id: post.author.id.map(|id| id.to_string()),
            author_avatar: post.author.avatar.clone(),
            topics: post.topics.iter().map(TopicRefResponse::from).collect(),
            images: post.images.clone(),
            reactions: post.reactions.clone(),
            upvotes: post.reaction_count(),
            follower_count: post.follower_count(),
            views: post.views,
            comment_count: post.comment_count,
            heat: post.heat(),
            created_at: post.created_at,
        }
    }
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self::from(&post)
    }
}

// ============================================================================
// Comment Mappers
// ============================================================================

impl From<&Comment> for CommentResponse {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.to_string(),
            post_id: comment.post_id.to_string(),
            content: comment.body.clone(),
            author: comment.author.name.clone(),
            author_id: comment.author.id.map(|id| id.to_string()),
            author_avatar: comment.author.avatar.clone(),
            parent_id: comment.parent_id.map(|id| id.to_string()),
            depth: comment.depth,
            reply_to_user_id: comment
                .reply_to
                .as_ref()
                .and_then(|t| t.id)
                .map(|id| id.to_string()),
            reply_to_name: comment.reply_to.as_ref().map(|t| t.name.clone()),
            reactions: comment.reactions.clone(),
            upvotes: comment.reaction_count(),
            created_at: comment.created_at,
        }
    }
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self::from(&comment)
    }
}

impl From<ThreadNode> for ThreadResponse {
    fn from(node: ThreadNode) -> Self {
        Self {
            comment: CommentResponse::from(&node.comment),
            heat: node.heat,
            descendant_count: node.descendant_count,
            replies: node.replies.into_iter().map(Self::from).collect(),
        }
    }
}

// ============================================================================
// Feed Mappers
// ============================================================================

impl From<FeedEntry> for FeedItemResponse {
    fn from(entry: FeedEntry) -> Self {
        match entry.content {
            FeedContent::Post(post) => Self::Post {
                reason: entry.reason,
                post: PostResponse::from(&post),
            },
            FeedContent::Reply(comment) => Self::Reply {
                reason: entry.reason,
                reply: CommentResponse::from(&comment),
            },
        }
    }
}

impl From<FeedPage> for FeedResponse {
    fn from(page: FeedPage) -> Self {
        Self {
            items: page.items.into_iter().map(FeedItemResponse::from).collect(),
            next_cursor: page.next_cursor.map(|c| c.to_string()),
        }
    }
}

// ============================================================================
// Topic Mappers
// ============================================================================

impl From<&Topic> for TopicResponse {
    fn from(topic: &Topic) -> Self {
        Self {
            id: topic.id.to_string(),
            name: topic.name.clone(),
            description: topic.description.clone(),
            icon: topic.icon.clone(),
            creator_id: topic.creator_id.map(|id| id.to_string()),
            follower_count: topic.follower_count(),
            post_count: topic.post_count,
            created_at: topic.created_at,
        }
    }
}

impl From<Topic> for TopicResponse {
    fn from(topic: Topic) -> Self {
        Self::from(&topic)
    }
}

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
            role: user.role.as_str().to_string(),
            follower_count: user.followers.len() as i64,
            following_count: user.following_users.len() as i64,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}
