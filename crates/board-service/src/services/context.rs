//! Service context - dependency container for services
//!
//! Holds all repositories and other dependencies needed by services.

use std::sync::Arc;

use board_common::auth::JwtService;
use board_core::traits::{
    CommentRepository, FollowRepository, PostRepository, TopicRepository, UserRepository,
};
use board_core::{Snowflake, SnowflakeGenerator};

use crate::agent::AgentController;

/// Default cap on the interactions list
const DEFAULT_INTERACTIONS_LIMIT: i64 = 50;

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Content store repositories
/// - JWT service for token verification
/// - Snowflake generator for ID generation
/// - The persona agent, when one is running
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    post_repo: Arc<dyn PostRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    topic_repo: Arc<dyn TopicRepository>,
    follow_repo: Arc<dyn FollowRepository>,

    // Services
    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,
    agent: Option<Arc<AgentController>>,

    interactions_limit: i64,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        post_repo: Arc<dyn PostRepository>,
        comment_repo: Arc<dyn CommentRepository>,
        topic_repo: Arc<dyn TopicRepository>,
        follow_repo: Arc<dyn FollowRepository>,
        jwt_service: Arc<JwtService>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        agent: Option<Arc<AgentController>>,
        interactions_limit: i64,
    ) -> Self {
        Self {
            user_repo,
            post_repo,
            comment_repo,
            topic_repo,
            follow_repo,
            jwt_service,
            snowflake_generator,
            agent,
            interactions_limit,
        }
    }

    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the post repository
    pub fn post_repo(&self) -> &dyn PostRepository {
        self.post_repo.as_ref()
    }

    /// Get the comment repository
    pub fn comment_repo(&self) -> &dyn CommentRepository {
        self.comment_repo.as_ref()
    }

    /// Get the topic repository
    pub fn topic_repo(&self) -> &dyn TopicRepository {
        self.topic_repo.as_ref()
    }

    /// Get the follow repository
    pub fn follow_repo(&self) -> &dyn FollowRepository {
        self.follow_repo.as_ref()
    }

    // === Services ===

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Get the persona agent, if one is configured
    pub fn agent(&self) -> Option<&Arc<AgentController>> {
        self.agent.as_ref()
    }

    /// Maximum number of entries in an interactions list
    pub fn interactions_limit(&self) -> i64 {
        self.interactions_limit
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("agent", &self.agent.is_some())
            .field("interactions_limit", &self.interactions_limit)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    post_repo: Option<Arc<dyn PostRepository>>,
    comment_repo: Option<Arc<dyn CommentRepository>>,
    topic_repo: Option<Arc<dyn TopicRepository>>,
    follow_repo: Option<Arc<dyn FollowRepository>>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    agent: Option<Arc<AgentController>>,
    interactions_limit: i64,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            user_repo: None,
            post_repo: None,
            comment_repo: None,
            topic_repo: None,
            follow_repo: None,
            jwt_service: None,
            snowflake_generator: None,
            agent: None,
            interactions_limit: DEFAULT_INTERACTIONS_LIMIT,
        }
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn post_repo(mut self, repo: Arc<dyn PostRepository>) -> Self {
        self.post_repo = Some(repo);
        self
    }

    pub fn comment_repo(mut self, repo: Arc<dyn CommentRepository>) -> Self {
        self.comment_repo = Some(repo);
        self
    }

    pub fn topic_repo(mut self, repo: Arc<dyn TopicRepository>) -> Self {
        self.topic_repo = Some(repo);
        self
    }

    pub fn follow_repo(mut self, repo: Arc<dyn FollowRepository>) -> Self {
        self.follow_repo = Some(repo);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// Attach the persona agent; new posts are handed to it
    pub fn agent(mut self, agent: Arc<AgentController>) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn interactions_limit(mut self, limit: i64) -> Self {
        self.interactions_limit = limit.max(1);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::MissingDependency` naming the first absent dependency
    pub fn build(self) -> super::error::ServiceResult<ServiceContext> {
        use super::error::ServiceError;

        Ok(ServiceContext::new(
            self.user_repo.ok_or_else(|| ServiceError::MissingDependency("user_repo"))?,
            self.post_repo.ok_or_else(|| ServiceError::MissingDependency("post_repo"))?,
            self.comment_repo.ok_or_else(|| ServiceError::MissingDependency("comment_repo"))?,
            self.topic_repo.ok_or_else(|| ServiceError::MissingDependency("topic_repo"))?,
            self.follow_repo.ok_or_else(|| ServiceError::MissingDependency("follow_repo"))?,
            self.jwt_service.ok_or_else(|| ServiceError::MissingDependency("jwt_service"))?,
            self.snowflake_generator
                .ok_or_else(|| ServiceError::MissingDependency("snowflake_generator"))?,
            self.agent,
            self.interactions_limit,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
