//! In-memory repositories and a scripted generator for service tests

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use board_common::auth::JwtService;
use board_common::AgentConfig;
use board_core::traits::{
    CommentRepository, FollowRepository, PostRepository, TopicRepository, UserRepository,
};
use board_core::{
    ActorKey, Author, Comment, DomainError, FeedCursor, FollowState, FollowTarget, Post,
    ReactionLedger, RepoResult, ReplyTarget, Snowflake, SnowflakeGenerator, Topic, User,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::agent::{AgentController, GenerationError, GenerationRequest, ReplyGenerator};
use crate::services::{ServiceContext, ServiceContextBuilder};

#[derive(Default)]
struct Tables {
    users: HashMap<Snowflake, User>,
    posts: HashMap<Snowflake, Post>,
    comments: HashMap<Snowflake, Comment>,
    topics: HashMap<Snowflake, Topic>,
    fail_comment_inserts: bool,
}

impl Tables {
    fn post_with_counts(&self, post: &Post) -> Post {
        let mut post = post.clone();
        post.comment_count = self.comments.values().filter(|c| c.post_id == post.id).count() as i64;
        post
    }

    fn topic_with_counts(&self, topic: &Topic) -> Topic {
        let mut topic = topic.clone();
        topic.post_count = self.posts.values().filter(|p| p.has_topic(topic.id)).count() as i64;
        topic
    }

    /// Posts matching `keep`, newest first
    fn posts_where(&self, keep: impl Fn(&Post) -> bool, limit: i64) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .values()
            .filter(|p| keep(p))
            .map(|p| self.post_with_counts(p))
            .collect();
        posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        posts.truncate(to_len(limit));
        posts
    }

    /// Comments matching `keep`, newest first
    fn comments_where(&self, keep: impl Fn(&Comment) -> bool, limit: i64) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self.comments.values().filter(|c| keep(c)).cloned().collect();
        comments.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        comments.truncate(to_len(limit));
        comments
    }

    fn post_author(&self, post_id: Snowflake) -> Option<Snowflake> {
        self.posts.get(&post_id).and_then(|p| p.author.id)
    }

    /// A reply to the user that the user did not write
    fn is_reply_to(&self, comment: &Comment, user_id: Snowflake) -> bool {
        !comment.author.is_user(user_id)
            && (comment.is_addressed_to(user_id)
                || (comment.is_root() && self.post_author(comment.post_id) == Some(user_id)))
    }

    /// Any comment by someone else on the user's post, or addressed to the user
    fn is_unread_for(&self, comment: &Comment, user_id: Snowflake) -> bool {
        !comment.author.is_user(user_id)
            && (comment.is_addressed_to(user_id) || self.post_author(comment.post_id) == Some(user_id))
    }
}

fn to_len(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or_default()
}

fn admitted(cursor: Option<&FeedCursor>, created_at: DateTime<Utc>, id: Snowflake) -> bool {
    cursor.map_or(true, |c| c.admits(created_at, id))
}

/// Thread-safe in-memory store implementing every repository trait
#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    ids: Arc<SnowflakeGenerator>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            ids: Arc::new(SnowflakeGenerator::new(7)),
        }
    }

    pub fn ids(&self) -> Arc<SnowflakeGenerator> {
        Arc::clone(&self.ids)
    }

    pub fn insert_user(&self, user: User) {
        self.tables.lock().users.insert(user.id, user);
    }

    pub fn insert_topic(&self, topic: Topic) {
        self.tables.lock().topics.insert(topic.id, topic);
    }

    pub fn insert_post(&self, post: Post) {
        self.tables.lock().posts.insert(post.id, post);
    }

    pub fn insert_comment(&self, comment: Comment) {
        self.tables.lock().comments.insert(comment.id, comment);
    }

    /// Make comment inserts fail with a database error
    pub fn fail_comment_inserts(&self, fail: bool) {
        self.tables.lock().fail_comment_inserts = fail;
    }

    /// Every stored comment, oldest first
    pub fn all_comments(&self) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self.tables.lock().comments.values().cloned().collect();
        comments.sort_by_key(|c| (c.created_at, c.id));
        comments
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Store a post with a generated id
pub fn seed_post(store: &MemoryStore, author: Author) -> Post {
    let id = store.ids.generate();
    let post = Post::new(id, format!("Post {id}"), "body".into(), author, vec![], vec![])
        .expect("post without topics is valid");
    store.insert_post(post.clone());
    post
}

/// Store a top-level comment with a generated id
pub fn seed_comment(store: &MemoryStore, post_id: Snowflake, author: Author) -> Comment {
    let comment = Comment::new_root(store.ids.generate(), post_id, "comment".into(), author);
    store.insert_comment(comment.clone());
    comment
}

/// Service context over the store, without an agent
pub fn test_context(store: &MemoryStore) -> ServiceContext {
    context_builder(store).build().expect("all dependencies set")
}

pub fn context_builder(store: &MemoryStore) -> ServiceContextBuilder {
    let repo = Arc::new(store.clone());
    ServiceContextBuilder::new()
        .user_repo(repo.clone())
        .post_repo(repo.clone())
        .comment_repo(repo.clone())
        .topic_repo(repo.clone())
        .follow_repo(repo)
        .jwt_service(Arc::new(JwtService::new("test-secret-key-that-is-long-enough", 900)))
        .snowflake_generator(store.ids())
}

/// Agent over the store; the persona also answers to "bot"
pub fn test_agent(store: &MemoryStore, generator: Arc<ScriptedGenerator>) -> Arc<AgentController> {
    let mut config = AgentConfig::default();
    config.persona.aliases = vec!["bot".into()];
    let repo = Arc::new(store.clone());
    Arc::new(AgentController::new(
        &config,
        repo.clone(),
        repo,
        generator,
        store.ids(),
    ))
}

// ============================================================================
// Post Repository
// ============================================================================

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Post>> {
        let tables = self.tables.lock();
        Ok(tables.posts.get(&id).map(|p| tables.post_with_counts(p)))
    }

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Post>> {
        Ok(self.tables.lock().posts_where(|p| ids.contains(&p.id), i64::MAX))
    }

    async fn list_recent(&self, before: Option<Snowflake>, limit: i64) -> RepoResult<Vec<Post>> {
        Ok(self
            .tables
            .lock()
            .posts_where(|p| before.map_or(true, |b| p.id < b), limit))
    }

    async fn list_hot(&self, limit: i64) -> RepoResult<Vec<Post>> {
        let mut posts = self.tables.lock().posts_where(|_| true, i64::MAX);
        posts.sort_by_key(|p| std::cmp::Reverse(p.heat()));
        posts.truncate(to_len(limit));
        Ok(posts)
    }

    async fn find_by_author(&self, author_id: Snowflake, limit: i64) -> RepoResult<Vec<Post>> {
        Ok(self.tables.lock().posts_where(|p| p.author.is_user(author_id), limit))
    }

    async fn find_reacted_by_author(&self, author_id: Snowflake, limit: i64) -> RepoResult<Vec<Post>> {
        Ok(self
            .tables
            .lock()
            .posts_where(|p| p.author.is_user(author_id) && !p.reactions.is_empty(), limit))
    }

    async fn find_by_topic(
        &self,
        topic_id: Snowflake,
        before: Option<Snowflake>,
        limit: i64,
    ) -> RepoResult<Vec<Post>> {
        Ok(self
            .tables
            .lock()
            .posts_where(|p| p.has_topic(topic_id) && before.map_or(true, |b| p.id < b), limit))
    }

    async fn create(&self, post: &Post) -> RepoResult<()> {
        self.insert_post(post.clone());
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<bool> {
        let mut tables = self.tables.lock();
        if tables.posts.remove(&id).is_none() {
            return Ok(false);
        }
        tables.comments.retain(|_, c| c.post_id != id);
        for user in tables.users.values_mut() {
            user.followed_posts.retain(|p| *p != id);
        }
        Ok(true)
    }

    async fn increment_views(&self, id: Snowflake) -> RepoResult<Option<i64>> {
        Ok(self.tables.lock().posts.get_mut(&id).map(|p| {
            p.views += 1;
            p.views
        }))
    }

    async fn feed_by_authors(
        &self,
        author_ids: &[Snowflake],
        cursor: Option<&FeedCursor>,
        limit: i64,
    ) -> RepoResult<Vec<Post>> {
        Ok(self.tables.lock().posts_where(
            |p| {
                p.author.id.is_some_and(|a| author_ids.contains(&a))
                    && admitted(cursor, p.created_at, p.id)
            },
            limit,
        ))
    }

    async fn feed_by_topics(
        &self,
        topic_ids: &[Snowflake],
        cursor: Option<&FeedCursor>,
        limit: i64,
    ) -> RepoResult<Vec<Post>> {
        Ok(self.tables.lock().posts_where(
            |p| p.topics.iter().any(|t| topic_ids.contains(&t.id)) && admitted(cursor, p.created_at, p.id),
            limit,
        ))
    }

    async fn toggle_reaction(
        &self,
        id: Snowflake,
        emoji: &str,
        actor: &ActorKey,
    ) -> RepoResult<Option<ReactionLedger>> {
        Ok(self.tables.lock().posts.get_mut(&id).map(|p| {
            p.reactions.toggle(emoji, actor);
            p.reactions.clone()
        }))
    }

    async fn reacted_by(&self, actor: &ActorKey, limit: i64) -> RepoResult<Vec<Post>> {
        Ok(self.tables.lock().posts_where(|p| p.reactions.reacted_by(actor), limit))
    }
}

// ============================================================================
// Comment Repository
// ============================================================================

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Comment>> {
        Ok(self.tables.lock().comments.get(&id).cloned())
    }

    async fn find_by_post(&self, post_id: Snowflake) -> RepoResult<Vec<Comment>> {
        Ok(self.tables.lock().comments_where(|c| c.post_id == post_id, i64::MAX))
    }

    async fn find_by_author(&self, author_id: Snowflake, limit: i64) -> RepoResult<Vec<Comment>> {
        Ok(self.tables.lock().comments_where(|c| c.author.is_user(author_id), limit))
    }

    async fn find_reacted_by_author(&self, author_id: Snowflake, limit: i64) -> RepoResult<Vec<Comment>> {
        Ok(self
            .tables
            .lock()
            .comments_where(|c| c.author.is_user(author_id) && !c.reactions.is_empty(), limit))
    }

    async fn create(&self, comment: &Comment) -> RepoResult<()> {
        let mut tables = self.tables.lock();
        if tables.fail_comment_inserts {
            return Err(DomainError::DatabaseError("insert failed".into()));
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn delete_in_order(&self, ids: &[Snowflake]) -> RepoResult<u64> {
        let mut tables = self.tables.lock();
        Ok(ids.iter().filter(|id| tables.comments.remove(id).is_some()).count() as u64)
    }

    async fn find_created_after(
        &self,
        after: DateTime<Utc>,
        after_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<Comment>> {
        let mut comments = self
            .tables
            .lock()
            .comments_where(|c| (c.created_at, c.id) > (after, after_id), i64::MAX);
        comments.reverse();
        comments.truncate(to_len(limit));
        Ok(comments)
    }

    async fn reply_exists(
        &self,
        post_id: Snowflake,
        author_id: Snowflake,
        target: &ReplyTarget,
        after: DateTime<Utc>,
    ) -> RepoResult<bool> {
        Ok(self.tables.lock().comments.values().any(|c| {
            c.post_id == post_id
                && c.author.is_user(author_id)
                && c.created_at >= after
                && c.reply_to.as_ref().is_some_and(|t| match target.id {
                    Some(id) => t.id == Some(id),
                    None => t.id.is_none() && t.name == target.name,
                })
        }))
    }

    async fn count_unread(&self, user_id: Snowflake, since: Option<DateTime<Utc>>) -> RepoResult<i64> {
        let tables = self.tables.lock();
        Ok(tables
            .comments
            .values()
            .filter(|c| since.map_or(true, |s| c.created_at > s) && tables.is_unread_for(c, user_id))
            .count() as i64)
    }

    async fn interaction_replies(&self, user_id: Snowflake, limit: i64) -> RepoResult<Vec<Comment>> {
        let tables = self.tables.lock();
        Ok(tables.comments_where(|c| tables.is_reply_to(c, user_id), limit))
    }

    async fn feed_comments(
        &self,
        author_ids: &[Snowflake],
        post_ids: &[Snowflake],
        cursor: Option<&FeedCursor>,
        limit: i64,
    ) -> RepoResult<Vec<Comment>> {
        Ok(self.tables.lock().comments_where(
            |c| {
                c.is_root()
                    && (c.author.id.is_some_and(|a| author_ids.contains(&a)) || post_ids.contains(&c.post_id))
                    && admitted(cursor, c.created_at, c.id)
            },
            limit,
        ))
    }

    async fn toggle_reaction(
        &self,
        id: Snowflake,
        emoji: &str,
        actor: &ActorKey,
    ) -> RepoResult<Option<ReactionLedger>> {
        Ok(self.tables.lock().comments.get_mut(&id).map(|c| {
            c.reactions.toggle(emoji, actor);
            c.reactions.clone()
        }))
    }

    async fn reacted_by(&self, actor: &ActorKey, limit: i64) -> RepoResult<Vec<Comment>> {
        Ok(self.tables.lock().comments_where(|c| c.reactions.reacted_by(actor), limit))
    }
}

// ============================================================================
// Topic Repository
// ============================================================================

#[async_trait]
impl TopicRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Topic>> {
        let tables = self.tables.lock();
        Ok(tables.topics.get(&id).map(|t| tables.topic_with_counts(t)))
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Topic>> {
        let tables = self.tables.lock();
        Ok(tables
            .topics
            .values()
            .find(|t| t.name.to_lowercase() == name.to_lowercase())
            .map(|t| tables.topic_with_counts(t)))
    }

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Topic>> {
        let tables = self.tables.lock();
        Ok(ids
            .iter()
            .filter_map(|id| tables.topics.get(id))
            .map(|t| tables.topic_with_counts(t))
            .collect())
    }

    async fn list_all(&self) -> RepoResult<Vec<Topic>> {
        let tables = self.tables.lock();
        let mut topics: Vec<Topic> = tables.topics.values().map(|t| tables.topic_with_counts(t)).collect();
        topics.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(topics)
    }

    async fn create(&self, topic: &Topic) -> RepoResult<()> {
        let mut tables = self.tables.lock();
        let lowered = topic.name.to_lowercase();
        if tables.topics.values().any(|t| t.name.to_lowercase() == lowered) {
            return Err(DomainError::TopicNameTaken(topic.name.clone()));
        }
        tables.topics.insert(topic.id, topic.clone());
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<bool> {
        let mut tables = self.tables.lock();
        if tables.topics.remove(&id).is_none() {
            return Ok(false);
        }
        for post in tables.posts.values_mut() {
            post.topics.retain(|t| t.id != id);
        }
        for user in tables.users.values_mut() {
            user.followed_topics.retain(|t| *t != id);
        }
        Ok(true)
    }
}

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.tables.lock().users.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<User>> {
        let tables = self.tables.lock();
        Ok(ids.iter().filter_map(|id| tables.users.get(id)).cloned().collect())
    }

    async fn upsert_profile(&self, user: &User) -> RepoResult<()> {
        let mut tables = self.tables.lock();
        match tables.users.get_mut(&user.id) {
            Some(existing) => {
                existing.name.clone_from(&user.name);
                existing.avatar.clone_from(&user.avatar);
                existing.bio.clone_from(&user.bio);
            }
            None => {
                tables.users.insert(user.id, user.clone());
            }
        }
        Ok(())
    }

    async fn set_last_read(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<bool> {
        Ok(self
            .tables
            .lock()
            .users
            .get_mut(&id)
            .map(|u| u.last_read_interactions = Some(at))
            .is_some())
    }
}

// ============================================================================
// Follow Repository
// ============================================================================

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn toggle(&self, follower_id: Snowflake, target: FollowTarget) -> RepoResult<Option<FollowState>> {
        let mut tables = self.tables.lock();
        let Some(follower) = tables.users.get(&follower_id) else {
            return Ok(None);
        };
        let following = !follower.follows(target);

        let followers = match target {
            FollowTarget::User(id) => tables.users.get_mut(&id).map(|u| &mut u.followers),
            FollowTarget::Post(id) => tables.posts.get_mut(&id).map(|p| &mut p.followers),
            FollowTarget::Topic(id) => tables.topics.get_mut(&id).map(|t| &mut t.followers),
        };
        let Some(followers) = followers else {
            return Ok(None);
        };
        toggle_member(followers, follower_id, following);
        let follower_count = followers.len() as i64;

        if let Some(follower) = tables.users.get_mut(&follower_id) {
            let list = match target {
                FollowTarget::User(_) => &mut follower.following_users,
                FollowTarget::Post(_) => &mut follower.followed_posts,
                FollowTarget::Topic(_) => &mut follower.followed_topics,
            };
            toggle_member(list, target.id(), following);
        }

        Ok(Some(FollowState {
            following,
            follower_count,
        }))
    }

    async fn state(&self, follower_id: Snowflake, target: FollowTarget) -> RepoResult<Option<FollowState>> {
        let tables = self.tables.lock();
        let followers = match target {
            FollowTarget::User(id) => tables.users.get(&id).map(|u| &u.followers),
            FollowTarget::Post(id) => tables.posts.get(&id).map(|p| &p.followers),
            FollowTarget::Topic(id) => tables.topics.get(&id).map(|t| &t.followers),
        };
        Ok(followers.map(|f| FollowState {
            following: f.contains(&follower_id),
            follower_count: f.len() as i64,
        }))
    }
}

fn toggle_member(list: &mut Vec<Snowflake>, id: Snowflake, present: bool) {
    list.retain(|x| *x != id);
    if present {
        list.push(id);
    }
}

// ============================================================================
// Scripted generator
// ============================================================================

/// Generator returning queued results, then a fixed reply
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, GenerationError>>>,
    fallback: String,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            fallback: text.to_string(),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Queue one result ahead of the fallback
    pub fn push(&self, result: Result<String, GenerationError>) {
        self.script.lock().push_back(result);
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ReplyGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().push(request.clone());
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}
