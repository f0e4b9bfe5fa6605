//! Typed builder for PortalPage.

use chrono::Utc;

use crate::portal_page::{PortalPage, Theme};

/// Value is missing on [`PortalPageBuilder`].
#[derive(Debug, Clone)]
pub struct Missing;

/// Value is present on [`PortalPageBuilder`].
#[derive(Debug, Clone)]
pub struct Present<T>(pub T);

/// [`PortalPage`] builder.
///
/// A page cannot be built without an owner and a slug.
#[derive(Debug, Clone)]
pub struct PortalPageBuilder<Owner, Slug> {
    owner: Owner,
    slug: Slug,
    title: String,
    bio: String,
    profile_image_url: String,
    theme: Theme,
}

impl PortalPageBuilder<Missing, Missing> {
    /// Create a new [`PortalPageBuilder`].
    pub fn new() -> Self {
        Self {
            owner: Missing,
            slug: Missing,
            title: String::default(),
            bio: String::default(),
            profile_image_url: String::default(),
            theme: Theme::default(),
        }
    }
}

impl Default for PortalPageBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Slug> PortalPageBuilder<Missing, Slug> {
    /// Update `user_id` field on [`PortalPageBuilder`].
    pub fn owner(self, user_id: i64) -> PortalPageBuilder<Present<i64>, Slug> {
        PortalPageBuilder {
            owner: Present(user_id),
            slug: self.slug,
            title: self.title,
            bio: self.bio,
            profile_image_url: self.profile_image_url,
            theme: self.theme,
        }
    }
}

impl<Owner> PortalPageBuilder<Owner, Missing> {
    /// Update `slug` field on [`PortalPageBuilder`].
    ///
    /// Slugs are stored lowercase.
    pub fn slug(
        self,
        slug: impl Into<String>,
    ) -> PortalPageBuilder<Owner, Present<String>> {
        PortalPageBuilder {
            owner: self.owner,
            slug: Present(slug.into().to_lowercase()),
            title: self.title,
            bio: self.bio,
            profile_image_url: self.profile_image_url,
            theme: self.theme,
        }
    }
}

impl<Owner, Slug> PortalPageBuilder<Owner, Slug> {
    /// Update `title` field on [`PortalPageBuilder`].
    pub fn title(mut self, title: impl ToString) -> Self {
        self.title = title.to_string();
        self
    }

    /// Update `bio` field on [`PortalPageBuilder`].
    pub fn bio(mut self, bio: Option<String>) -> Self {
        self.bio = bio.unwrap_or_default();
        self
    }

    /// Update `profile_image_url` field on [`PortalPageBuilder`].
    pub fn profile_image_url(mut self, url: Option<String>) -> Self {
        self.profile_image_url = url.unwrap_or_default();
        self
    }

    /// Update `theme` field on [`PortalPageBuilder`]. Light when `None`.
    pub fn theme(mut self, theme: Option<Theme>) -> Self {
        self.theme = theme.unwrap_or_default();
        self
    }
}

impl PortalPageBuilder<Present<i64>, Present<String>> {
    /// Build a [`PortalPage`], not persisted yet.
    pub fn build(self) -> PortalPage {
        let now = Utc::now();

        PortalPage {
            id: 0,
            user_id: self.owner.0,
            slug: self.slug.0,
            title: self.title,
            bio: self.bio,
            profile_image_url: self.profile_image_url,
            theme: self.theme,
            created_at: now,
            updated_at: now,
            links: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build() {
        let page = PortalPage::builder()
            .slug("John-Doe")
            .title("John's Page")
            .owner(1)
            .theme(None)
            .build();

        assert_eq!(page.id, 0);
        assert_eq!(page.user_id, 1);
        assert_eq!(page.slug, "john-doe");
        assert_eq!(page.theme, Theme::Light);
        assert_eq!(page.bio, "");
        assert!(page.links.is_empty());
        assert_eq!(page.created_at, page.updated_at);
    }
}
