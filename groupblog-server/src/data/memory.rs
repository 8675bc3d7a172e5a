//! In-process store used by the test suite. It mirrors the constraints of
//! `migrations/0001_init.sql` so service code sees the same failures it would
//! get from Postgres.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::pagination::{Page, PageRequest, Paginator};
use crate::data::comment_repository::CommentRepository;
use crate::data::follow_repository::FollowRepository;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::comment::{Comment, NewComment};
use crate::domain::error::DomainError;
use crate::domain::follow::Follow;
use crate::domain::group::Group;
use crate::domain::post::{ListingOwner, NewPost, Post, PostChanges, PostFilter};
use crate::domain::user::User;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    groups: Vec<Group>,
    posts: Vec<NewPost>,
    comments: Vec<NewComment>,
    follows: Vec<Follow>,
}

impl State {
    fn post_view(&self, row: &NewPost) -> Post {
        let group_slug = row.group_id.and_then(|id| {
            self.groups
                .iter()
                .find(|g| g.id == id)
                .map(|g| g.slug.clone())
        });
        Post {
            id: row.id,
            text: row.text.clone(),
            created_at: row.created_at,
            author_id: row.author_id,
            author_username: self
                .users
                .get(&row.author_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            group_id: row.group_id,
            group_slug,
            image: row.image.clone(),
        }
    }

    fn comment_view(&self, row: &NewComment) -> Comment {
        Comment {
            id: row.id,
            post_id: row.post_id,
            author_id: Some(row.author_id),
            author_username: self.users.get(&row.author_id).map(|u| u.username.clone()),
            text: row.text.clone(),
            created_at: row.created_at,
        }
    }

    fn resolve_owner(&self, filter: &PostFilter) -> Result<Option<ListingOwner>, DomainError> {
        match filter {
            PostFilter::All | PostFilter::FollowedBy(_) => Ok(None),
            PostFilter::GroupSlug(slug) => self
                .groups
                .iter()
                .find(|g| &g.slug == slug)
                .map(|g| Some(ListingOwner::Group(g.clone())))
                .ok_or_else(|| DomainError::GroupNotFound(slug.clone())),
            PostFilter::AuthorUsername(username) => self
                .users
                .values()
                .find(|u| &u.username == username)
                .map(|u| Some(ListingOwner::Author(u.clone())))
                .ok_or_else(|| DomainError::UserNotFound(username.clone())),
        }
    }

    fn matches(&self, row: &NewPost, filter: &PostFilter, owner: Option<&ListingOwner>) -> bool {
        match (filter, owner) {
            (PostFilter::FollowedBy(user_id), _) => self
                .follows
                .iter()
                .any(|f| f.user_id == *user_id && f.author_id == row.author_id),
            (_, Some(ListingOwner::Group(group))) => row.group_id == Some(group.id),
            (_, Some(ListingOwner::Author(author))) => row.author_id == author.id,
            _ => true,
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    stale_follow_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `FollowRepository::find` miss existing edges, as a reader that
    /// raced a concurrent insert would.
    pub fn simulate_stale_follow_reads(&self, enabled: bool) {
        self.stale_follow_reads.store(enabled, Ordering::SeqCst);
    }

    pub fn delete_post(&self, id: Uuid) {
        let mut state = self.state.lock().unwrap();
        state.posts.retain(|p| p.id != id);
        state.comments.retain(|c| c.post_id != id);
    }

    pub fn follow_count(&self) -> usize {
        self.state.lock().unwrap().follows.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn upsert(&self, user: User) -> Result<User, DomainError> {
        let mut state = self.state.lock().unwrap();
        if state
            .users
            .values()
            .any(|u| u.username == user.username && u.id != user.id)
        {
            return Err(DomainError::ConstraintViolation("users_username_key".into()));
        }
        let stored = state
            .users
            .entry(user.id)
            .and_modify(|u| u.username = user.username.clone())
            .or_insert(user);
        Ok(stored.clone())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.state.lock().unwrap().users.get(&id).cloned())
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create(&self, group: Group) -> Result<Group, DomainError> {
        let mut state = self.state.lock().unwrap();
        if state.groups.iter().any(|g| g.slug == group.slug) {
            return Err(DomainError::GroupAlreadyExists(group.slug));
        }
        state.groups.push(group.clone());
        Ok(group)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Group>, DomainError> {
        let mut groups = self.state.lock().unwrap().groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.slug.cmp(&b.slug)));
        Ok(groups)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError> {
        let mut state = self.state.lock().unwrap();
        if !state.users.contains_key(&post.author_id) {
            return Err(DomainError::ConstraintViolation("posts_author_id_fkey".into()));
        }
        if let Some(group_id) = post.group_id {
            if !state.groups.iter().any(|g| g.id == group_id) {
                return Err(DomainError::ConstraintViolation("posts_group_id_fkey".into()));
            }
        }
        let view = state.post_view(&post);
        state.posts.push(post);
        Ok(view)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| state.post_view(p)))
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>, DomainError> {
        let mut state = self.state.lock().unwrap();
        let Some(row) = state.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        row.text = changes.text;
        row.group_id = changes.group_id;
        if changes.image.is_some() {
            row.image = changes.image;
        }
        let row = row.clone();
        Ok(Some(state.post_view(&row)))
    }

    async fn page(
        &self,
        filter: PostFilter,
        paginator: &Paginator,
        request: PageRequest,
    ) -> Result<(Option<ListingOwner>, Page<Post>), DomainError> {
        let state = self.state.lock().unwrap();
        let owner = state.resolve_owner(&filter)?;
        let mut rows: Vec<&NewPost> = state
            .posts
            .iter()
            .filter(|p| state.matches(p, &filter, owner.as_ref()))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        let posts = rows.into_iter().map(|p| state.post_view(p)).collect();
        Ok((owner, paginator.paginate(posts, request)))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, comment: NewComment) -> Result<Comment, DomainError> {
        let mut state = self.state.lock().unwrap();
        if !state.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(DomainError::ConstraintViolation("comments_post_id_fkey".into()));
        }
        let view = state.comment_view(&comment);
        state.comments.push(comment);
        Ok(view)
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| state.comment_view(c))
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn insert(&self, follow: Follow) -> Result<Follow, DomainError> {
        let mut state = self.state.lock().unwrap();
        if follow.user_id == follow.author_id {
            return Err(DomainError::ConstraintViolation("follows_no_self_follow".into()));
        }
        if state
            .follows
            .iter()
            .any(|f| f.user_id == follow.user_id && f.author_id == follow.author_id)
        {
            return Err(DomainError::ConstraintViolation("follows_unique_pair".into()));
        }
        state.follows.push(follow.clone());
        Ok(follow)
    }

    async fn find(&self, user_id: Uuid, author_id: Uuid) -> Result<Option<Follow>, DomainError> {
        if self.stale_follow_reads.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .follows
            .iter()
            .find(|f| f.user_id == user_id && f.author_id == author_id)
            .cloned())
    }

    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        let before = state.follows.len();
        state
            .follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(state.follows.len() != before)
    }
}
