use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::group::Group;
use crate::domain::user::User;

/// A post as shown in feeds and on the detail page, joined with its author's
/// username and its group's slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_username: String,
    pub group_id: Option<Uuid>,
    pub group_slug: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    pub fn new(
        author_id: Uuid,
        text: String,
        group_id: Option<Uuid>,
        image: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            text,
            group_id,
            image,
            created_at: Utc::now(),
        }
    }
}

/// Replacement values for an edited post. `created_at` and the author never
/// change; an absent image keeps the stored one.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
}

/// Which posts a feed query selects. Groups and authors are named the way
/// clients address them and are resolved in the same snapshot as the posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    All,
    GroupSlug(String),
    AuthorUsername(String),
    FollowedBy(Uuid),
}

/// The group or author a filtered listing belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingOwner {
    Group(Group),
    Author(User),
}
