use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::data::follow_repository::FollowRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::{error::DomainError, follow::Follow, user::User};

const FOLLOW_CONSTRAINTS: [&str; 2] = ["follows_unique_pair", "follows_no_self_follow"];

/// Maintains follow edges. Self-follows, duplicate follows and unfollowing
/// an absent edge are all silent no-ops.
#[derive(Clone)]
pub struct FollowService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl FollowService {
    pub fn new(users: Arc<dyn UserRepository>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { users, follows }
    }

    pub async fn resolve_author(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(username.to_string()))
    }

    /// Returns the edge from `user_id` to `author_id`, creating it when
    /// missing. Returns `None` only for a self-follow.
    #[instrument(skip(self))]
    pub async fn follow(
        &self,
        user_id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<Follow>, DomainError> {
        if user_id == author_id {
            debug!("self-follow ignored");
            return Ok(None);
        }
        if let Some(existing) = self.follows.find(user_id, author_id).await? {
            return Ok(Some(existing));
        }

        match self.follows.insert(Follow::new(user_id, author_id)).await {
            Ok(created) => Ok(Some(created)),
            Err(DomainError::ConstraintViolation(constraint))
                if FOLLOW_CONSTRAINTS.contains(&constraint.as_str()) =>
            {
                debug!(%constraint, "follow insert lost to an existing edge");
                self.follows.find(user_id, author_id).await
            }
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self))]
    pub async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<(), DomainError> {
        if user_id == author_id {
            return Ok(());
        }
        let removed = self.follows.delete(user_id, author_id).await?;
        if !removed {
            debug!("no follow edge to remove");
        }
        Ok(())
    }

    pub async fn is_following(
        &self,
        user_id: Uuid,
        author_id: Uuid,
    ) -> Result<bool, DomainError> {
        Ok(self.follows.find(user_id, author_id).await?.is_some())
    }
}
