//! User service
//!
//! Profiles, author resolution for new content, and the persona bootstrap.

use board_common::PersonaConfig;
use board_core::{Author, DomainError, Snowflake, User};
use tracing::{info, instrument};

use crate::dto::UserResponse;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Get a user's public profile
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: Snowflake) -> ServiceResult<UserResponse> {
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;
        Ok(UserResponse::from(&user))
    }

    /// Author identity for new content
    ///
    /// A signed-in caller writes under their profile; an anonymous caller
    /// under the supplied display name, or "Anonymous".
    #[instrument(skip(self))]
    pub async fn resolve_author(
        &self,
        user_id: Option<Snowflake>,
        anonymous_name: Option<&str>,
    ) -> ServiceResult<Author> {
        match user_id {
            Some(id) => {
                let user = self
                    .ctx
                    .user_repo()
                    .find_by_id(id)
                    .await?
                    .ok_or(DomainError::UserNotFound(id))?;
                Ok(user.as_author())
            }
            None => Ok(Author::anonymous(anonymous_name)),
        }
    }

    /// Create or refresh the persona's profile row
    #[instrument(skip(self, persona), fields(persona_id = persona.id))]
    pub async fn ensure_persona(&self, persona: &PersonaConfig) -> ServiceResult<User> {
        let mut user = User::new(Snowflake::new(persona.id), persona.name.clone());
        user.avatar = persona.avatar.clone();
        user.bio = Some(persona.bio.clone()).filter(|b| !b.trim().is_empty());

        self.ctx.user_repo().upsert_profile(&user).await?;

        info!(persona_id = %user.id, name = %user.name, "Persona profile ready");

        Ok(user)
    }
}
