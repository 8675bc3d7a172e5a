use crate::application::feed_service::FeedPage;
use crate::application::pagination::PageRequest;
use crate::domain::follow::Follow;
use serde::{Deserialize, Serialize};

// ======================= POSTS =======================

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Full replacement of a post's editable fields. A missing `group` detaches
/// the post from its group; a missing `image` keeps the current one.
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

// ======================= GROUPS =======================

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

// ======================= FEEDS =======================

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::parse(self.page.as_deref())
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub feed: FeedPage,
    pub following: bool,
}

// ======================= FOLLOWS =======================

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub author: String,
    pub following: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge: Option<Follow>,
}
