//! Portal page update.

use std::sync::Arc;

use validator::Validate;

use super::{PortalPageId, Result};
use crate::error::ApplicationError;
use crate::portal_page::repository::{PortalPageRepository, RepositoryError};
use crate::portal_page::validation::{
    SLUG_MAX_LENGTH, SLUG_MIN_LENGTH, TEXT_MAX_LENGTH, TITLE_MAX_LENGTH,
    non_empty, validate_optional_url, validate_slug, validate_theme,
};
use crate::portal_page::{LinkParams, Theme};

/// Input of [`UpdatePortalPage`].
///
/// `None` or empty fields are left unchanged. `links` replaces the stored
/// links entirely.
#[derive(Clone, Debug, Default, Validate)]
pub struct UpdatePortalPageParams {
    pub id: i64,
    pub user_id: i64,
    #[validate(
        length(
            min = SLUG_MIN_LENGTH,
            max = SLUG_MAX_LENGTH,
            message = "slug must be between 3 and 50 characters"
        ),
        custom(function = "validate_slug")
    )]
    pub slug: Option<String>,
    #[validate(length(
        min = 1,
        max = TITLE_MAX_LENGTH,
        message = "title must be between 1 and 100 characters"
    ))]
    pub title: Option<String>,
    #[validate(length(
        max = TEXT_MAX_LENGTH,
        message = "bio must be at most 500 characters"
    ))]
    pub bio: Option<String>,
    #[validate(custom(
        function = "validate_optional_url",
        message = "profile_image_url must be a valid URL"
    ))]
    pub profile_image_url: Option<String>,
    #[validate(custom(function = "validate_theme"))]
    pub theme: Option<String>,
    pub links: Vec<LinkParams>,
}

/// Update a portal page and reconcile its links.
pub struct UpdatePortalPage {
    repo: Arc<dyn PortalPageRepository>,
}

impl UpdatePortalPage {
    pub fn new(repo: Arc<dyn PortalPageRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        mut params: UpdatePortalPageParams,
    ) -> Result<PortalPageId> {
        let mut page = match self.repo.find_by_id(params.id).await {
            Ok(page) => page,
            Err(RepositoryError::NotFound) => {
                return Err(ApplicationError::PortalPageNotFound);
            },
            Err(err) => return Err(err.into()),
        };

        if page.user_id != params.user_id {
            tracing::warn!(
                portal_page_id = page.id,
                user_id = params.user_id,
                "update attempt on a portal page owned by another user"
            );
            return Err(ApplicationError::Unauthorized);
        }

        params.slug = non_empty(params.slug).map(|slug| slug.to_lowercase());
        params.title = non_empty(params.title);
        params.bio = non_empty(params.bio);
        params.profile_image_url = non_empty(params.profile_image_url);
        params.theme = non_empty(params.theme);
        params.validate()?;
        for link in &params.links {
            link.validate()?;
        }

        if let Some(slug) = params.slug.as_ref().filter(|slug| **slug != page.slug) {
            match self.repo.find_by_slug(slug).await {
                Ok(other) if other.id != page.id => {
                    return Err(ApplicationError::SlugExists);
                },
                Ok(_) | Err(RepositoryError::NotFound) => {},
                Err(err) => return Err(err.into()),
            }
        }

        if let Some(slug) = params.slug {
            page.slug = slug;
        }
        if let Some(title) = params.title {
            page.title = title;
        }
        if let Some(bio) = params.bio {
            page.bio = bio;
        }
        if let Some(url) = params.profile_image_url {
            page.profile_image_url = url;
        }
        if let Some(theme) = params.theme {
            page.theme = theme.parse::<Theme>()?;
        }

        page.links.clear();
        for link in params.links {
            page.add_link(link);
        }

        match self.repo.update(&mut page).await {
            Ok(()) => {},
            Err(RepositoryError::UniqueViolation(_)) => {
                return Err(ApplicationError::SlugExists);
            },
            Err(RepositoryError::NotFound) => {
                return Err(ApplicationError::PortalPageNotFound);
            },
            Err(err) => return Err(err.into()),
        }

        tracing::info!(
            portal_page_id = page.id,
            links = page.links.len(),
            "portal page updated"
        );

        Ok(PortalPageId { id: page.id })
    }
}
