//! Portal page creation.

use std::sync::Arc;

use validator::Validate;

use super::{PortalPageId, Result};
use crate::error::ApplicationError;
use crate::portal_page::{PortalPage, Theme};
use crate::portal_page::repository::{PortalPageRepository, RepositoryError};
use crate::portal_page::validation::{
    SLUG_MAX_LENGTH, SLUG_MIN_LENGTH, TEXT_MAX_LENGTH, TITLE_MAX_LENGTH,
    non_empty, validate_optional_url, validate_slug, validate_theme,
};

/// Input of [`CreatePortalPage`].
#[derive(Clone, Debug, Validate)]
pub struct CreatePortalPageParams {
    #[validate(range(min = 1, message = "user_id is required"))]
    pub user_id: i64,
    #[validate(
        length(
            min = SLUG_MIN_LENGTH,
            max = SLUG_MAX_LENGTH,
            message = "slug must be between 3 and 50 characters"
        ),
        custom(function = "validate_slug")
    )]
    pub slug: String,
    #[validate(length(
        min = 1,
        max = TITLE_MAX_LENGTH,
        message = "title must be between 1 and 100 characters"
    ))]
    pub title: String,
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
}

/// Create a portal page owned by a user.
pub struct CreatePortalPage {
    repo: Arc<dyn PortalPageRepository>,
}

impl CreatePortalPage {
    pub fn new(repo: Arc<dyn PortalPageRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        mut params: CreatePortalPageParams,
    ) -> Result<PortalPageId> {
        params.slug = params.slug.to_lowercase();
        params.bio = non_empty(params.bio);
        params.profile_image_url = non_empty(params.profile_image_url);
        params.theme = non_empty(params.theme);
        params.validate()?;

        match self.repo.find_by_slug(&params.slug).await {
            Ok(_) => return Err(ApplicationError::SlugExists),
            Err(RepositoryError::NotFound) => {},
            Err(err) => return Err(err.into()),
        }

        let theme = params.theme.as_deref().map(str::parse::<Theme>).transpose()?;
        let mut page = PortalPage::builder()
            .owner(params.user_id)
            .slug(params.slug)
            .title(params.title)
            .bio(params.bio)
            .profile_image_url(params.profile_image_url)
            .theme(theme)
            .build();

        match self.repo.create(&mut page).await {
            Ok(()) => {},
            // Another request took the slug after our check.
            Err(RepositoryError::UniqueViolation(_)) => {
                return Err(ApplicationError::SlugExists);
            },
            Err(err) => return Err(err.into()),
        }

        tracing::info!(
            portal_page_id = page.id,
            user_id = page.user_id,
            slug = %page.slug,
            "portal page created"
        );

        Ok(PortalPageId { id: page.id })
    }
}
