//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Environment variables: DATABASE_URL, JWT_SECRET
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_json, assert_status, check_test_env, fixtures::*, TestServer,
};
use reqwest::StatusCode;

async fn create_post(server: &TestServer, token: &str, request: &CreatePostRequest) -> PostResponse {
    let response = server.post_auth("/api/posts", token, request).await.unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

async fn create_message(
    server: &TestServer,
    token: &str,
    post_id: &str,
    request: &CreateMessageRequest,
) -> MessageResponse {
    let response = server
        .post_auth(&format!("/api/posts/{post_id}/messages"), token, request)
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["checks"]["database"], "healthy");
    assert_eq!(body["checks"]["agent"], "disabled");
}

// ============================================================================
// Post Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_get_post() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = server.sign_in("alice").await.unwrap();

    let request = CreatePostRequest::unique();
    let post = create_post(&server, &alice.token, &request).await;
    assert_eq!(post.title, request.title);
    assert_eq!(post.author, alice.name);
    assert_eq!(post.author_id, Some(alice.id.to_string()));
    assert_eq!(post.comment_count, 0);
    assert_eq!(post.upvotes, 0);

    let response = server.get(&format!("/api/posts/{}", post.id)).await.unwrap();
    let fetched: PostResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(fetched.id, post.id);
}

#[tokio::test]
async fn test_anonymous_post_uses_supplied_name() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");

    let response = server
        .post("/api/posts", &CreatePostRequest::anonymous("cy"))
        .await
        .unwrap();
    let post: PostResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(post.author, "cy");
    assert!(post.author_id.is_none());

    let response = server.post("/api/posts", &CreatePostRequest::unique()).await.unwrap();
    let post: PostResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(post.author, "Anonymous");
}

#[tokio::test]
async fn test_record_view() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = server.sign_in("alice").await.unwrap();
    let post = create_post(&server, &alice.token, &CreatePostRequest::unique()).await;

    let path = format!("/api/posts/{}/view", post.id);
    server.post_empty(&path, None).await.unwrap();
    let response = server.post_empty(&path, None).await.unwrap();
    let views: ViewResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(views.views, 2);
}

#[tokio::test]
async fn test_get_post_errors() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/api/posts/not-an-id").await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(error.error.code, "INVALID_PATH_PARAMETER");

    let response = server.get("/api/posts/1").await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(error.error.code, "UNKNOWN_POST");
}

#[tokio::test]
async fn test_delete_post_requires_author() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = server.sign_in("alice").await.unwrap();
    let bob = server.sign_in("bob").await.unwrap();
    let post = create_post(&server, &alice.token, &CreatePostRequest::unique()).await;
    let path = format!("/api/posts/{}", post.id);

    let response = server.delete_auth(&path, &bob.token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server.delete_auth(&path, &alice.token).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get(&path).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// Thread Tests
// ============================================================================

#[tokio::test]
async fn test_reply_depth_is_capped() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = server.sign_in("alice").await.unwrap();
    let bob = server.sign_in("bob").await.unwrap();
    let post = create_post(&server, &alice.token, &CreatePostRequest::unique()).await;

    let root = create_message(&server, &bob.token, &post.id, &CreateMessageRequest::root("first")).await;
    assert_eq!(root.depth, 1);
    assert!(root.parent_id.is_none());

    let second = create_message(
        &server,
        &alice.token,
        &post.id,
        &CreateMessageRequest::reply(&root.id, "second"),
    )
    .await;
    assert_eq!(second.depth, 2);
    assert_eq!(second.reply_to_user_id, Some(bob.id.to_string()));
    assert_eq!(second.reply_to_name.as_deref(), Some(bob.name.as_str()));

    let third = create_message(
        &server,
        &bob.token,
        &post.id,
        &CreateMessageRequest::reply(&second.id, "third"),
    )
    .await;
    assert_eq!(third.depth, 3);

    let response = server
        .post_auth(
            &format!("/api/posts/{}/messages", post.id),
            &alice.token,
            &CreateMessageRequest::reply(&third.id, "fourth"),
        )
        .await
        .unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(error.error.code, "MAX_DEPTH_EXCEEDED");

    let response = server.get(&format!("/api/posts/{}/messages", post.id)).await.unwrap();
    let threads: Vec<ThreadResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].message.id, root.id);
    assert_eq!(threads[0].descendant_count, 2);
    assert_eq!(threads[0].replies[0].replies[0].message.id, third.id);

    let response = server.get(&format!("/api/posts/{}", post.id)).await.unwrap();
    let post: PostResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(post.comment_count, 3);
}

#[tokio::test]
async fn test_reply_to_unknown_parent() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = server.sign_in("alice").await.unwrap();
    let post = create_post(&server, &alice.token, &CreatePostRequest::unique()).await;

    let response = server
        .post_auth(
            &format!("/api/posts/{}/messages", post.id),
            &alice.token,
            &CreateMessageRequest::reply("1", "orphan"),
        )
        .await
        .unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(error.error.code, "PARENT_NOT_FOUND");
}

#[tokio::test]
async fn test_delete_message_removes_replies() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = server.sign_in("alice").await.unwrap();
    let bob = server.sign_in("bob").await.unwrap();
    let post = create_post(&server, &alice.token, &CreatePostRequest::unique()).await;

    let root = create_message(&server, &alice.token, &post.id, &CreateMessageRequest::root("root")).await;
    create_message(&server, &bob.token, &post.id, &CreateMessageRequest::reply(&root.id, "reply")).await;

    let path = format!("/api/messages/{}", root.id);
    let response = server.delete_auth(&path, &bob.token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server.delete_auth(&path, &alice.token).await.unwrap();
    let deleted: DeletedResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(deleted.removed, 2);

    let response = server.get(&format!("/api/posts/{}/messages", post.id)).await.unwrap();
    let threads: Vec<ThreadResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(threads.is_empty());
}

// ============================================================================
// Reaction Tests
// ============================================================================

#[tokio::test]
async fn test_reactions_toggle_per_actor() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = server.sign_in("alice").await.unwrap();
    let post = create_post(&server, &alice.token, &CreatePostRequest::unique()).await;
    let request = ReactRequest::post(&post.id, "👍");

    let response = server.post_auth("/api/react", &alice.token, &request).await.unwrap();
    let result: ReactionResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(result.success);
    assert_eq!(result.upvotes, 1);

    let response = server.post_from("/api/react", "203.0.113.9", &request).await.unwrap();
    let result: ReactionResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(result.upvotes, 2);
    assert_eq!(
        result.reactions["👍"],
        vec![alice.id.to_string(), "ip:203.0.113.9".to_string()]
    );

    // Same actor again removes the reaction
    let response = server.post_auth("/api/react", &alice.token, &request).await.unwrap();
    let result: ReactionResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(result.upvotes, 1);
    assert_eq!(result.reactions["👍"], vec!["ip:203.0.113.9".to_string()]);
}

#[tokio::test]
async fn test_reaction_on_missing_target() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = server.sign_in("alice").await.unwrap();

    let response = server
        .post_auth("/api/react", &alice.token, &ReactRequest::message("1", "🔥"))
        .await
        .unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(error.error.code, "TARGET_NOT_FOUND");
}

// ============================================================================
// Follow Tests
// ============================================================================

#[tokio::test]
async fn test_follow_user_toggles() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = server.sign_in("alice").await.unwrap();
    let bob = server.sign_in("bob").await.unwrap();
    let path = format!("/api/users/{}/follow", bob.id);

    let response = server.post_empty(&path, Some(&alice.token)).await.unwrap();
    let state: FollowResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(state.following);
    assert_eq!(state.follower_count, 1);

    let response = server.get(&format!("/api/users/{}", bob.id)).await.unwrap();
    let profile: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(profile.follower_count, 1);

    let response = server.post_empty(&path, Some(&alice.token)).await.unwrap();
    let state: FollowResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!state.following);
    assert_eq!(state.follower_count, 0);
}

#[tokio::test]
async fn test_follow_requires_auth_and_rejects_self() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = server.sign_in("alice").await.unwrap();
    let path = format!("/api/users/{}/follow", alice.id);

    let response = server.post_empty(&path, None).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server.post_empty(&path, Some(&alice.token)).await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(error.error.code, "SELF_FOLLOW");
}

// ============================================================================
// Notification Tests
// ============================================================================

#[tokio::test]
async fn test_unread_count_and_mark_read() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = server.sign_in("alice").await.unwrap();
    let bob = server.sign_in("bob").await.unwrap();
    let post = create_post(&server, &alice.token, &CreatePostRequest::unique()).await;

    let root = create_message(&server, &bob.token, &post.id, &CreateMessageRequest::root("nice")).await;
    // Own replies never count
    create_message(&server, &alice.token, &post.id, &CreateMessageRequest::reply(&root.id, "thanks")).await;

    let response = server.get_auth("/api/notifications/count", &alice.token).await.unwrap();
    let unread: UnreadCountResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(unread.count, 1);

    let response = server
        .post_empty("/api/notifications/read", Some(&alice.token))
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get_auth("/api/notifications/count", &alice.token).await.unwrap();
    let unread: UnreadCountResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(unread.count, 0);
}

#[tokio::test]
async fn test_interactions_are_private() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = server.sign_in("alice").await.unwrap();
    let bob = server.sign_in("bob").await.unwrap();
    let post = create_post(&server, &alice.token, &CreatePostRequest::unique()).await;
    create_message(&server, &bob.token, &post.id, &CreateMessageRequest::root("hello")).await;

    let path = format!("/api/users/{}/interactions", alice.id);
    let response = server.get_auth(&path, &bob.token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server.get_auth(&path, &alice.token).await.unwrap();
    let entries: Vec<InteractionResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, "reply");
    assert_eq!(entries[0].actor_name, bob.name);
    assert_eq!(entries[0].post_id, post.id);
}

// ============================================================================
// Topic and Discovery Tests
// ============================================================================

#[tokio::test]
async fn test_topic_lifecycle() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = server.sign_in("alice").await.unwrap();
    let request = CreateTopicRequest::unique();

    let response = server.post_auth("/api/topics", &alice.token, &request).await.unwrap();
    let topic: TopicResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(topic.name, request.name);
    assert_eq!(topic.creator_id, Some(alice.id.to_string()));

    let response = server.post_auth("/api/topics", &alice.token, &request).await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(error.error.code, "TOPIC_NAME_TAKEN");

    create_post(&server, &alice.token, &CreatePostRequest::in_topics(&[&topic.id])).await;

    let response = server.get(&format!("/api/topics/{}/posts", topic.id)).await.unwrap();
    let posts: Vec<PostResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].topics[0].name, topic.name);
}

#[tokio::test]
async fn test_discovery_feed_follows_topics_and_users() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = server.sign_in("alice").await.unwrap();
    let bob = server.sign_in("bob").await.unwrap();

    let response = server
        .post_auth("/api/topics", &bob.token, &CreateTopicRequest::unique())
        .await
        .unwrap();
    let topic: TopicResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_empty(&format!("/api/topics/{}/follow", topic.id), Some(&alice.token))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let topical = create_post(&server, &bob.token, &CreatePostRequest::in_topics(&[&topic.id])).await;

    let response = server.get_auth("/api/discovery", &alice.token).await.unwrap();
    let feed: FeedResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(feed.items.len(), 1);
    assert_eq!(feed.items[0]["type"], "post");
    assert_eq!(feed.items[0]["reason"], "following_topic");
    assert_eq!(feed.items[0]["post"]["id"], topical.id.as_str());

    // Following the author upgrades the reason
    let response = server
        .post_empty(&format!("/api/users/{}/follow", bob.id), Some(&alice.token))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get_auth("/api/discovery", &alice.token).await.unwrap();
    let feed: FeedResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(feed.items[0]["reason"], "following_user");
    assert!(feed.next_cursor.is_none());
}

#[tokio::test]
async fn test_discovery_requires_auth() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/api/discovery").await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(error.error.code, "MISSING_AUTHORIZATION");
}
