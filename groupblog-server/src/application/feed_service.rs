//! Feed Builder: selects posts for a scope, newest first, and paginates them.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::application::pagination::{PageMeta, PageRequest, Paginator};
use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::post::{ListingOwner, Post, PostFilter};
use crate::domain::user::User;
use crate::infrastructure::cache::ListingCache;

/// Cache slot of the rendered index. Shared by every visitor and every page
/// number within one TTL window.
pub const INDEX_CACHE_KEY: &str = "index_page";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedScope {
    All,
    Group(String),
    Author(String),
    FollowedBy(Uuid),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum FeedHeader {
    All,
    Group { group: Group },
    Author { author: User },
    FollowedBy { user_id: Uuid },
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    #[serde(flatten)]
    pub header: FeedHeader,
    pub posts: Vec<Post>,
    pub page: PageMeta,
}

#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    paginator: Paginator,
    cache: Arc<ListingCache>,
    cache_ttl: Duration,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        paginator: Paginator,
        cache: Arc<ListingCache>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            posts,
            paginator,
            cache,
            cache_ttl,
        }
    }

    pub fn cache(&self) -> &ListingCache {
        &self.cache
    }

    #[instrument(skip(self))]
    pub async fn build(
        &self,
        scope: FeedScope,
        request: PageRequest,
    ) -> Result<FeedPage, DomainError> {
        let follower = match scope {
            FeedScope::FollowedBy(user_id) => Some(user_id),
            _ => None,
        };
        let filter = match scope {
            FeedScope::All => PostFilter::All,
            FeedScope::Group(slug) => PostFilter::GroupSlug(slug),
            FeedScope::Author(username) => PostFilter::AuthorUsername(username),
            FeedScope::FollowedBy(user_id) => PostFilter::FollowedBy(user_id),
        };

        let (owner, page) = self.posts.page(filter, &self.paginator, request).await?;
        let header = match (owner, follower) {
            (Some(ListingOwner::Group(group)), _) => FeedHeader::Group { group },
            (Some(ListingOwner::Author(author)), _) => FeedHeader::Author { author },
            (None, Some(user_id)) => FeedHeader::FollowedBy { user_id },
            (None, None) => FeedHeader::All,
        };
        debug!(
            page = page.meta.number,
            total_pages = page.meta.total_pages,
            "feed built"
        );

        Ok(FeedPage {
            header,
            posts: page.items,
            page: page.meta,
        })
    }

    /// Rendered JSON of the global feed, served from the listing cache while
    /// the cached copy is fresh. The requested page only matters on a miss.
    #[instrument(skip(self))]
    pub async fn index(&self, request: PageRequest) -> Result<Bytes, DomainError> {
        if let Some(rendered) = self.cache.get(INDEX_CACHE_KEY) {
            return Ok(rendered);
        }

        let feed = self.build(FeedScope::All, request).await?;
        let rendered = Bytes::from(serde_json::to_vec(&feed)?);
        self.cache
            .set(INDEX_CACHE_KEY, rendered.clone(), self.cache_ttl);
        Ok(rendered)
    }
}
