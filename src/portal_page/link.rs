use chrono::{DateTime, Utc};
use validator::Validate;

use crate::portal_page::validation::{
    TEXT_MAX_LENGTH, TITLE_MAX_LENGTH, validate_optional_url, validate_url,
};

/// Outbound link displayed on a portal page.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub id: i64,
    pub portal_page_id: i64,
    pub title: String,
    pub url: String,
    pub description: String,
    pub icon_url: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values used to create or update a [`Link`].
///
/// An `id` of zero designates a link that does not exist yet.
#[derive(Clone, Debug, Default, PartialEq, Validate)]
pub struct LinkParams {
    pub id: i64,
    #[validate(length(
        min = 1,
        max = TITLE_MAX_LENGTH,
        message = "link title must be between 1 and 100 characters"
    ))]
    pub title: String,
    #[validate(custom(
        function = "validate_url",
        message = "link url must be a valid URL"
    ))]
    pub url: String,
    #[validate(length(
        max = TEXT_MAX_LENGTH,
        message = "link description must be at most 500 characters"
    ))]
    pub description: String,
    #[validate(custom(
        function = "validate_optional_url",
        message = "link icon_url must be a valid URL"
    ))]
    pub icon_url: String,
    #[validate(range(min = 1, message = "display_order must be at least 1"))]
    pub display_order: i32,
}

impl Link {
    /// Only reachable through [`super::PortalPage::add_link`].
    pub(super) fn new(portal_page_id: i64, params: LinkParams) -> Self {
        let now = Utc::now();

        Self {
            id: params.id,
            portal_page_id,
            title: params.title,
            url: params.url,
            description: params.description,
            icon_url: params.icon_url,
            display_order: params.display_order,
            created_at: now,
            updated_at: now,
        }
    }

    pub(super) fn update(&mut self, params: LinkParams) {
        if !params.title.is_empty() {
            self.title = params.title;
        }
        if !params.url.is_empty() {
            self.url = params.url;
        }
        if !params.description.is_empty() {
            self.description = params.description;
        }
        if !params.icon_url.is_empty() {
            self.icon_url = params.icon_url;
        }
        if params.display_order > 0 {
            self.display_order = params.display_order;
        }
        self.updated_at = Utc::now();
    }
}
