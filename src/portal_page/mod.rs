//! Portal pages and their links.
//!
//! [`PortalPage`] is the aggregate root: links are only created, updated or
//! removed through it.

mod builder;
mod link;
pub mod repository;
pub mod usecase;
pub mod validation;

pub use builder::*;
pub use link::*;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Display theme of a [`PortalPage`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(ApplicationError::InvalidParams(
                "theme must be one of: light, dark".into(),
            )),
        }
    }
}

/// Personal page of a user.
#[derive(Clone, Debug, PartialEq)]
pub struct PortalPage {
    pub id: i64,
    pub user_id: i64,
    pub slug: String,
    pub title: String,
    pub bio: String,
    pub profile_image_url: String,
    pub theme: Theme,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub links: Vec<Link>,
}

impl PortalPage {
    /// Create a new [`PortalPageBuilder`].
    pub fn builder() -> PortalPageBuilder<Missing, Missing> {
        PortalPageBuilder::new()
    }

    /// Append a new link owned by this page.
    ///
    /// `params.id` is kept as is: zero marks a link that is not persisted
    /// yet.
    pub fn add_link(&mut self, params: LinkParams) {
        let link = Link::new(self.id, params);
        self.links.push(link);
        self.updated_at = Utc::now();
    }

    /// Update the link identified by `link_id`.
    ///
    /// Empty strings and non-positive orders leave the field unchanged.
    pub fn update_link(
        &mut self,
        link_id: i64,
        params: LinkParams,
    ) -> Result<(), ApplicationError> {
        let link = self
            .links
            .iter_mut()
            .find(|link| link.id == link_id)
            .ok_or(ApplicationError::LinkNotFound(link_id))?;

        link.update(params);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove the link identified by `link_id`, keeping the others in order.
    pub fn remove_link(&mut self, link_id: i64) -> Result<(), ApplicationError> {
        let index = self
            .links
            .iter()
            .position(|link| link.id == link_id)
            .ok_or(ApplicationError::LinkNotFound(link_id))?;

        self.links.remove(index);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Sort links by display order, then by id.
    pub fn sort_links(&mut self) {
        self.links
            .sort_by(|a, b| (a.display_order, a.id).cmp(&(b.display_order, b.id)));
    }

    /// Copy of this page without its links.
    pub fn summary(&self) -> Self {
        Self {
            links: Vec::new(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> PortalPage {
        let mut page = PortalPage::builder()
            .owner(1)
            .slug("john-doe")
            .title("John's Page")
            .build();
        page.id = 7;
        page
    }

    fn link(id: i64, title: &str, display_order: i32) -> LinkParams {
        LinkParams {
            id,
            title: title.into(),
            url: format!("https://example.com/{title}"),
            display_order,
            ..Default::default()
        }
    }

    #[test]
    fn test_theme_parsing() {
        assert_eq!("light".parse::<Theme>().unwrap(), Theme::Light);
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("Dark".parse::<Theme>().is_err());
        assert_eq!(Theme::default().to_string(), "light");
    }

    #[test]
    fn test_add_link_sets_back_reference() {
        let mut page = page();
        let before = page.updated_at;

        page.add_link(link(0, "blog", 1));

        assert_eq!(page.links.len(), 1);
        assert_eq!(page.links[0].portal_page_id, 7);
        assert_eq!(page.links[0].id, 0);
        assert!(page.updated_at >= before);
    }

    #[test]
    fn test_update_link_only_overrides_provided_fields() {
        let mut page = page();
        page.add_link(link(3, "blog", 1));

        page.update_link(
            3,
            LinkParams {
                title: "new blog".into(),
                display_order: 0,
                ..Default::default()
            },
        )
        .unwrap();

        let link = &page.links[0];
        assert_eq!(link.title, "new blog");
        assert_eq!(link.url, "https://example.com/blog");
        assert_eq!(link.display_order, 1);
    }

    #[test]
    fn test_update_missing_link() {
        let mut page = page();
        assert!(matches!(
            page.update_link(42, LinkParams::default()),
            Err(ApplicationError::LinkNotFound(42))
        ));
    }

    #[test]
    fn test_remove_link_preserves_order() {
        let mut page = page();
        page.add_link(link(1, "a", 1));
        page.add_link(link(2, "b", 2));
        page.add_link(link(3, "c", 3));

        page.remove_link(2).unwrap();

        let ids = page.links.iter().map(|l| l.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 3]);
        assert!(matches!(
            page.remove_link(2),
            Err(ApplicationError::LinkNotFound(2))
        ));
    }

    #[test]
    fn test_sort_links() {
        let mut page = page();
        page.add_link(link(1, "b", 2));
        page.add_link(link(2, "a", 1));
        page.add_link(link(3, "c", 3));

        page.sort_links();

        let orders = page.links.iter().map(|l| l.display_order).collect::<Vec<_>>();
        assert_eq!(orders, vec![1, 2, 3]);
        assert!(page.summary().links.is_empty());
    }
}
