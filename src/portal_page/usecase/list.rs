//! Portal pages of a user.

use std::sync::Arc;

use super::Result;
use crate::error::ApplicationError;
use crate::portal_page::repository::PortalPageRepository;

/// Short description of a portal page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortalPageSummary {
    pub id: i64,
    pub slug: String,
    pub title: String,
}

/// List the pages owned by a user, oldest first.
pub struct ListPortalPages {
    repo: Arc<dyn PortalPageRepository>,
}

impl ListPortalPages {
    pub fn new(repo: Arc<dyn PortalPageRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, user_id: i64) -> Result<Vec<PortalPageSummary>> {
        if user_id <= 0 {
            return Err(ApplicationError::InvalidParams("user_id is required".into()));
        }

        let pages = self.repo.list_by_user_id(user_id).await?;

        Ok(pages
            .into_iter()
            .map(|page| PortalPageSummary {
                id: page.id,
                slug: page.slug,
                title: page.title,
            })
            .collect())
    }
}
