use crate::domain::error::DomainError;
use crate::domain::follow::Follow;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

/// Storage for follow edges. `insert` relies on the `follows_unique_pair`
/// and `follows_no_self_follow` constraints and reports a rejected row as
/// [`DomainError::ConstraintViolation`].
#[async_trait]
pub trait FollowRepository: Send + Sync {
    async fn insert(&self, follow: Follow) -> Result<Follow, DomainError>;
    async fn find(&self, user_id: Uuid, author_id: Uuid) -> Result<Option<Follow>, DomainError>;
    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError>;
}

#[derive(Clone)]
pub struct PostgresFollowRepository {
    pool: PgPool,
}

impl PostgresFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn insert(&self, follow: Follow) -> Result<Follow, DomainError> {
        let mut tx = self.pool.begin().await?;
        let created = sqlx::query_as::<_, Follow>(
            r#"
            INSERT INTO follows (id, user_id, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, author_id
            "#,
        )
        .bind(follow.id)
        .bind(follow.user_id)
        .bind(follow.author_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DomainError::from)?;
        tx.commit().await?;

        info!(user_id = %created.user_id, author_id = %created.author_id, "follow created");
        Ok(created)
    }

    async fn find(&self, user_id: Uuid, author_id: Uuid) -> Result<Option<Follow>, DomainError> {
        sqlx::query_as::<_, Follow>(
            "SELECT id, user_id, author_id FROM follows WHERE user_id = $1 AND author_id = $2",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while looking up follow {} -> {}: {}", user_id, author_id, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await?;
        let deleted = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        tx.commit().await?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(user_id = %user_id, author_id = %author_id, "follow removed");
        }
        Ok(removed)
    }
}
