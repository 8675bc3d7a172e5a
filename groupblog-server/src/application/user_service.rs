use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::{error::DomainError, user::User};

/// Local mirror of identity-provider accounts.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Creates the local user for a verified token subject on first sight and
    /// keeps the username in step with the provider afterwards.
    #[instrument(skip(self))]
    pub async fn provision(&self, id: Uuid, username: &str) -> Result<User, DomainError> {
        if let Some(user) = self.repo.find_by_id(id).await? {
            if user.username == username {
                return Ok(user);
            }
        }
        self.repo.upsert(User::new(id, username.to_string())).await
    }
}
