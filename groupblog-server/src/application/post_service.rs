use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::data::comment_repository::CommentRepository;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::comment::{Comment, NewComment};
use crate::domain::error::DomainError;
use crate::domain::post::{NewPost, Post, PostChanges};

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
}

/// Post authoring, editing and commenting.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            posts,
            groups,
            comments,
        }
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    pub async fn post_detail(&self, id: Uuid) -> Result<PostDetail, DomainError> {
        let post = self.get_post(id).await?;
        let comments = self.comments.list_for_post(id).await?;
        Ok(PostDetail { post, comments })
    }

    #[instrument(skip(self, text))]
    pub async fn create_post(
        &self,
        author_id: Uuid,
        text: String,
        group_slug: Option<String>,
        image: Option<String>,
    ) -> Result<Post, DomainError> {
        let text = required_text(&text, "post text")?;
        let group_id = self.resolve_group(group_slug).await?;
        let post = NewPost::new(author_id, text, group_id, blank_to_none(image));
        self.posts.create(post).await
    }

    /// Replaces text and group of a post; only its author may do so.
    #[instrument(skip(self, text))]
    pub async fn edit_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        text: String,
        group_slug: Option<String>,
        image: Option<String>,
    ) -> Result<Post, DomainError> {
        let existing = self.get_post(post_id).await?;
        if existing.author_id != user_id {
            info!(post_id = %post_id, user_id = %user_id, "edit refused for non-author");
            return Err(DomainError::Forbidden);
        }

        let changes = PostChanges {
            text: required_text(&text, "post text")?,
            group_id: self.resolve_group(group_slug).await?,
            image: blank_to_none(image),
        };
        self.posts
            .update(post_id, changes)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))
    }

    #[instrument(skip(self, text))]
    pub async fn add_comment(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        text: String,
    ) -> Result<Comment, DomainError> {
        self.get_post(post_id).await?;
        let text = required_text(&text, "comment text")?;
        self.comments
            .create(NewComment::new(post_id, author_id, text))
            .await
    }

    async fn resolve_group(&self, slug: Option<String>) -> Result<Option<Uuid>, DomainError> {
        match blank_to_none(slug) {
            None => Ok(None),
            Some(slug) => {
                let group = self.groups.find_by_slug(&slug).await?;
                group
                    .map(|group| Some(group.id))
                    .ok_or(DomainError::GroupNotFound(slug))
            }
        }
    }
}

fn required_text(text: &str, field: &str) -> Result<String, DomainError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;
    use crate::data::user_repository::UserRepository;
    use crate::domain::group::Group;
    use crate::domain::user::User;

    struct Fixture {
        posts: PostService,
        author: User,
        other: User,
        group: Group,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let author = store
            .upsert(User::new(Uuid::new_v4(), "alice".into()))
            .await
            .unwrap();
        let other = store
            .upsert(User::new(Uuid::new_v4(), "bob".into()))
            .await
            .unwrap();
        let group = GroupRepository::create(
            store.as_ref(),
            Group::new("News".into(), "news".into(), "daily".into()),
        )
        .await
        .unwrap();
        Fixture {
            posts: PostService::new(store.clone(), store.clone(), store),
            author,
            other,
            group,
        }
    }

    #[tokio::test]
    async fn created_post_carries_author_group_and_image() {
        let fx = fixture().await;

        let post = fx
            .posts
            .create_post(
                fx.author.id,
                "  hello  ".into(),
                Some("news".into()),
                Some("posts/cat.gif".into()),
            )
            .await
            .unwrap();

        assert_eq!(post.text, "hello");
        assert_eq!(post.author_username, "alice");
        assert_eq!(post.group_id, Some(fx.group.id));
        assert_eq!(post.group_slug.as_deref(), Some("news"));
        assert_eq!(post.image.as_deref(), Some("posts/cat.gif"));
    }

    #[tokio::test]
    async fn blank_text_is_rejected() {
        let fx = fixture().await;

        let err = fx
            .posts
            .create_post(fx.author.id, "   ".into(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_group_is_not_found() {
        let fx = fixture().await;

        let err = fx
            .posts
            .create_post(fx.author.id, "text".into(), Some("missing".into()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::GroupNotFound(slug) if slug == "missing"));
    }

    #[tokio::test]
    async fn only_the_author_can_edit() {
        let fx = fixture().await;
        let post = fx
            .posts
            .create_post(fx.author.id, "original".into(), Some("news".into()), None)
            .await
            .unwrap();

        let err = fx
            .posts
            .edit_post(fx.other.id, post.id, "hijacked".into(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));
        assert_eq!(fx.posts.get_post(post.id).await.unwrap().text, "original");
    }

    #[tokio::test]
    async fn edit_replaces_group_and_keeps_image_and_timestamp() {
        let fx = fixture().await;
        let post = fx
            .posts
            .create_post(
                fx.author.id,
                "original".into(),
                Some("news".into()),
                Some("posts/a.gif".into()),
            )
            .await
            .unwrap();

        let edited = fx
            .posts
            .edit_post(fx.author.id, post.id, "edited".into(), None, None)
            .await
            .unwrap();

        assert_eq!(edited.text, "edited");
        assert_eq!(edited.group_id, None);
        assert_eq!(edited.image.as_deref(), Some("posts/a.gif"));
        assert_eq!(edited.created_at, post.created_at);
    }

    #[tokio::test]
    async fn editing_a_missing_post_is_not_found() {
        let fx = fixture().await;
        let id = Uuid::new_v4();

        let err = fx
            .posts
            .edit_post(fx.author.id, id, "text".into(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PostNotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn comments_show_up_on_post_detail_in_order() {
        let fx = fixture().await;
        let post = fx
            .posts
            .create_post(fx.author.id, "post".into(), None, None)
            .await
            .unwrap();

        fx.posts
            .add_comment(fx.other.id, post.id, "first".into())
            .await
            .unwrap();
        fx.posts
            .add_comment(fx.author.id, post.id, "second".into())
            .await
            .unwrap();

        let detail = fx.posts.post_detail(post.id).await.unwrap();
        let texts: Vec<&str> = detail.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
        assert_eq!(detail.comments[0].author_username.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn comment_on_missing_post_is_not_found() {
        let fx = fixture().await;

        let err = fx
            .posts
            .add_comment(fx.other.id, Uuid::new_v4(), "hi".into())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PostNotFound(_)));
    }
}
