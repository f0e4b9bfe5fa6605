//! Portal page lookups.

use std::sync::Arc;

use validator::Validate;

use super::Result;
use crate::error::ApplicationError;
use crate::portal_page::PortalPage;
use crate::portal_page::repository::{PortalPageRepository, RepositoryError};

/// Input of [`FindPortalPageById`].
#[derive(Clone, Copy, Debug, Validate)]
pub struct FindPortalPageByIdParams {
    #[validate(range(min = 1, message = "user_id is required"))]
    pub user_id: i64,
    #[validate(range(min = 1, message = "id is required"))]
    pub id: i64,
}

/// Owner-only lookup of a portal page.
pub struct FindPortalPageById {
    repo: Arc<dyn PortalPageRepository>,
}

impl FindPortalPageById {
    pub fn new(repo: Arc<dyn PortalPageRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, params: FindPortalPageByIdParams) -> Result<PortalPage> {
        params.validate()?;

        let page = match self.repo.find_by_id(params.id).await {
            Ok(page) => page,
            Err(RepositoryError::NotFound) => {
                return Err(ApplicationError::PortalPageNotFound);
            },
            Err(err) => return Err(err.into()),
        };

        if page.user_id != params.user_id {
            return Err(ApplicationError::Unauthorized);
        }

        Ok(page)
    }
}

/// Public lookup of a portal page.
pub struct FindPortalPageBySlug {
    repo: Arc<dyn PortalPageRepository>,
}

impl FindPortalPageBySlug {
    pub fn new(repo: Arc<dyn PortalPageRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, slug: &str) -> Result<PortalPage> {
        if slug.is_empty() {
            return Err(ApplicationError::InvalidParams("slug is required".into()));
        }

        match self.repo.find_by_slug(&slug.to_lowercase()).await {
            Ok(page) => Ok(page),
            Err(RepositoryError::NotFound) => Err(ApplicationError::PortalPageNotFound),
            Err(err) => Err(err.into()),
        }
    }
}
