use std::sync::Arc;

use tracing::instrument;

use crate::data::group_repository::GroupRepository;
use crate::domain::{error::DomainError, group::Group};

#[derive(Clone)]
pub struct GroupService {
    repo: Arc<dyn GroupRepository>,
}

impl GroupService {
    pub fn new(repo: Arc<dyn GroupRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, description))]
    pub async fn create_group(
        &self,
        title: String,
        slug: String,
        description: String,
    ) -> Result<Group, DomainError> {
        let title = title.trim();
        let slug = slug.trim();
        if title.is_empty() {
            return Err(DomainError::Validation("group title must not be empty".into()));
        }
        if !is_valid_slug(slug) {
            return Err(DomainError::Validation(
                "slug may only contain letters, digits, '-' and '_'".into(),
            ));
        }
        let group = Group::new(title.to_string(), slug.to_string(), description);
        self.repo.create(group).await
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>, DomainError> {
        self.repo.list().await
    }
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}
