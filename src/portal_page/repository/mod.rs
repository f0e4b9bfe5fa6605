//! Portal page persistence.

#[cfg(test)]
mod conformance;
mod memory;
mod postgres;

pub use memory::MemoryPortalPageRepository;
pub use postgres::PgPortalPageRepository;

use async_trait::async_trait;

pub use crate::error::RepositoryError;
use crate::portal_page::PortalPage;

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Port for portal page persistence.
///
/// Pages are written with their links in a single operation. Generated ids
/// and timestamps are written back into the given page.
#[async_trait]
pub trait PortalPageRepository: Send + Sync {
    /// Insert a page and all its links.
    async fn create(&self, page: &mut PortalPage) -> Result<()>;

    /// Replace a page and reconcile its links.
    ///
    /// Submitted links with a known id are updated, the others are
    /// inserted. Stored links missing from the page are deleted.
    async fn update(&self, page: &mut PortalPage) -> Result<()>;

    /// Find a page by slug, links sorted by display order.
    async fn find_by_slug(&self, slug: &str) -> Result<PortalPage>;

    /// Find a page by id, links sorted by display order.
    async fn find_by_id(&self, id: i64) -> Result<PortalPage>;

    /// List pages of a user, oldest first, without links.
    async fn list_by_user_id(&self, user_id: i64) -> Result<Vec<PortalPage>>;
}
