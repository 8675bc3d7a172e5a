use crate::application::pagination::{Page, PageRequest, Paginator};
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::post::{ListingOwner, NewPost, Post, PostChanges, PostFilter};
use crate::domain::user::User;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, error, info};
use uuid::Uuid;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>, DomainError>;
    /// Resolves the filter's group or author, then counts and fetches one
    /// page of posts, newest first, all from a single consistent snapshot.
    /// An unknown group or author is `NotFound`.
    async fn page(
        &self,
        filter: PostFilter,
        paginator: &Paginator,
        request: PageRequest,
    ) -> Result<(Option<ListingOwner>, Page<Post>), DomainError>;
}

const POST_COLUMNS: &str = r#"
    SELECT p.id, p.text, p.created_at, p.author_id, u.username AS author_username,
           p.group_id, g.slug AS group_slug, p.image
"#;

const POST_JOINS: &str = r#"
    JOIN users u ON u.id = p.author_id
    LEFT JOIN groups g ON g.id = p.group_id
"#;

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A [`PostFilter`] with its group or author resolved to an id.
#[derive(Debug, Clone, Copy)]
enum Condition {
    All,
    Group(Uuid),
    Author(Uuid),
    FollowedBy(Uuid),
}

fn push_condition(builder: &mut QueryBuilder<'_, Postgres>, condition: Condition) {
    match condition {
        Condition::All => {}
        Condition::Group(group_id) => {
            builder.push(" WHERE p.group_id = ").push_bind(group_id);
        }
        Condition::Author(author_id) => {
            builder.push(" WHERE p.author_id = ").push_bind(author_id);
        }
        Condition::FollowedBy(user_id) => {
            builder
                .push(" WHERE p.author_id IN ")
                .push("(SELECT f.author_id FROM follows f WHERE f.user_id = ")
                .push_bind(user_id)
                .push(")");
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError> {
        let query = format!(
            r#"
            WITH p AS (
                INSERT INTO posts (id, text, created_at, author_id, group_id, image)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            {POST_COLUMNS} FROM p {POST_JOINS}
            "#
        );
        let created = sqlx::query_as::<_, Post>(&query)
            .bind(post.id)
            .bind(&post.text)
            .bind(post.created_at)
            .bind(post.author_id)
            .bind(post.group_id)
            .bind(&post.image)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to create post: {}", e);
                DomainError::from(e)
            })?;

        info!(post_id = %created.id, author_id = %created.author_id, "post created");
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let query = format!("{POST_COLUMNS} FROM posts p {POST_JOINS} WHERE p.id = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error find_by_id {}: {}", id, e);
                DomainError::Internal(e.to_string())
            })
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>, DomainError> {
        let query = format!(
            r#"
            WITH p AS (
                UPDATE posts
                SET text = $1,
                    group_id = $2,
                    image = COALESCE($3, image)
                WHERE id = $4
                RETURNING *
            )
            {POST_COLUMNS} FROM p {POST_JOINS}
            "#
        );
        let post = sqlx::query_as::<_, Post>(&query)
            .bind(&changes.text)
            .bind(changes.group_id)
            .bind(&changes.image)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to update post {}: {}", id, e);
                DomainError::from(e)
            })?;

        if post.is_some() {
            info!(post_id = %id, "post updated");
        }

        Ok(post)
    }

    async fn page(
        &self,
        filter: PostFilter,
        paginator: &Paginator,
        request: PageRequest,
    ) -> Result<(Option<ListingOwner>, Page<Post>), DomainError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let (owner, condition) = match filter {
            PostFilter::All => (None, Condition::All),
            PostFilter::GroupSlug(slug) => {
                let group = sqlx::query_as::<_, Group>(
                    "SELECT id, title, slug, description FROM groups WHERE slug = $1",
                )
                .bind(&slug)
                .fetch_optional(&mut *tx)
                .await?;
                let group = group.ok_or(DomainError::GroupNotFound(slug))?;
                let condition = Condition::Group(group.id);
                (Some(ListingOwner::Group(group)), condition)
            }
            PostFilter::AuthorUsername(username) => {
                let author = sqlx::query_as::<_, User>(
                    "SELECT id, username, created_at FROM users WHERE username = $1",
                )
                .bind(&username)
                .fetch_optional(&mut *tx)
                .await?;
                let author = author.ok_or(DomainError::UserNotFound(username))?;
                let condition = Condition::Author(author.id);
                (Some(ListingOwner::Author(author)), condition)
            }
            PostFilter::FollowedBy(user_id) => (None, Condition::FollowedBy(user_id)),
        };

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts p");
        push_condition(&mut count, condition);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                error!("db error while counting posts: {}", e);
                DomainError::Internal(e.to_string())
            })?;

        let window = paginator.window(usize::try_from(total).unwrap_or_default(), request);

        let mut select = QueryBuilder::<Postgres>::new(POST_COLUMNS);
        select.push(" FROM posts p ").push(POST_JOINS);
        push_condition(&mut select, condition);
        select
            .push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
            .push_bind(window.limit as i64)
            .push(" OFFSET ")
            .push_bind(window.offset as i64);

        let posts = select
            .build_query_as::<Post>()
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| {
                error!("db error while fetching posts: {}", e);
                DomainError::Internal(e.to_string())
            })?;

        tx.commit().await?;

        debug!(?condition, page = window.number, total, "posts page fetched");
        Ok((owner, Page::from_window(posts, window)))
    }
}
