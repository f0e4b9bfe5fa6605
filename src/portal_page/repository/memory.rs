//! In-memory portal page repository.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{PortalPageRepository, RepositoryError, Result};
use crate::portal_page::PortalPage;

const SLUG_CONSTRAINT: &str = "portal_pages_slug_key";

#[derive(Default)]
struct Store {
    pages: HashMap<i64, PortalPage>,
    slugs: HashMap<String, i64>,
    owners: HashMap<i64, Vec<i64>>,
    last_page_id: i64,
    last_link_id: i64,
}

impl Store {
    fn next_page_id(&mut self) -> i64 {
        self.last_page_id += 1;
        self.last_page_id
    }

    fn next_link_id(&mut self) -> i64 {
        self.last_link_id += 1;
        self.last_link_id
    }
}

/// Portal pages kept in process memory.
///
/// Every returned page is a copy: callers never share state with the store.
#[derive(Default)]
pub struct MemoryPortalPageRepository {
    store: RwLock<Store>,
}

impl MemoryPortalPageRepository {
    /// Create a new empty [`MemoryPortalPageRepository`].
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PortalPageRepository for MemoryPortalPageRepository {
    async fn create(&self, page: &mut PortalPage) -> Result<()> {
        let mut store = self.store.write().await;

        if store.slugs.contains_key(&page.slug) {
            return Err(RepositoryError::UniqueViolation(SLUG_CONSTRAINT.into()));
        }

        let now = Utc::now();
        page.id = store.next_page_id();
        page.created_at = now;
        page.updated_at = now;

        for link in page.links.iter_mut() {
            link.id = store.next_link_id();
            link.portal_page_id = page.id;
            link.created_at = now;
            link.updated_at = now;
        }

        store.slugs.insert(page.slug.clone(), page.id);
        store.owners.entry(page.user_id).or_default().push(page.id);
        store.pages.insert(page.id, page.clone());

        Ok(())
    }

    async fn update(&self, page: &mut PortalPage) -> Result<()> {
        let mut store = self.store.write().await;

        let (previous_slug, user_id, created_at, stored_links) =
            match store.pages.get(&page.id) {
                Some(stored) => (
                    stored.slug.clone(),
                    stored.user_id,
                    stored.created_at,
                    stored
                        .links
                        .iter()
                        .map(|link| (link.id, link.created_at))
                        .collect::<HashMap<_, _>>(),
                ),
                None => return Err(RepositoryError::NotFound),
            };

        if previous_slug != page.slug
            && store.slugs.get(&page.slug).is_some_and(|id| *id != page.id)
        {
            return Err(RepositoryError::UniqueViolation(SLUG_CONSTRAINT.into()));
        }

        let now = Utc::now();
        let mut kept = HashSet::new();

        for link in page.links.iter_mut() {
            match stored_links.get(&link.id) {
                Some(link_created_at) if kept.insert(link.id) => {
                    link.created_at = *link_created_at;
                },
                _ => {
                    link.id = store.next_link_id();
                    link.created_at = now;
                },
            }
            link.portal_page_id = page.id;
            link.updated_at = now;
        }

        page.user_id = user_id;
        page.created_at = created_at;
        page.updated_at = now;

        store.slugs.remove(&previous_slug);
        store.slugs.insert(page.slug.clone(), page.id);
        store.pages.insert(page.id, page.clone());

        Ok(())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<PortalPage> {
        let store = self.store.read().await;

        let mut page = store
            .slugs
            .get(slug)
            .and_then(|id| store.pages.get(id))
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        page.sort_links();

        Ok(page)
    }

    async fn find_by_id(&self, id: i64) -> Result<PortalPage> {
        let store = self.store.read().await;

        let mut page = store
            .pages
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        page.sort_links();

        Ok(page)
    }

    async fn list_by_user_id(&self, user_id: i64) -> Result<Vec<PortalPage>> {
        let store = self.store.read().await;

        let mut pages = store
            .owners
            .get(&user_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| store.pages.get(id))
                    .map(PortalPage::summary)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        pages.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));

        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::super::conformance;
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_ids() {
        conformance::create_assigns_ids(&MemoryPortalPageRepository::new()).await;
    }

    #[tokio::test]
    async fn test_create_duplicate_slug() {
        conformance::create_duplicate_slug(&MemoryPortalPageRepository::new())
            .await;
    }

    #[tokio::test]
    async fn test_find_sorts_links() {
        conformance::find_sorts_links(&MemoryPortalPageRepository::new()).await;
    }

    #[tokio::test]
    async fn test_find_missing() {
        conformance::find_missing(&MemoryPortalPageRepository::new()).await;
    }

    #[tokio::test]
    async fn test_update_reconciles_links() {
        conformance::update_reconciles_links(&MemoryPortalPageRepository::new())
            .await;
    }

    #[tokio::test]
    async fn test_update_missing_page() {
        conformance::update_missing_page(&MemoryPortalPageRepository::new())
            .await;
    }

    #[tokio::test]
    async fn test_update_slug() {
        conformance::update_slug(&MemoryPortalPageRepository::new()).await;
    }

    #[tokio::test]
    async fn test_list_by_user_id() {
        conformance::list_by_user_id(&MemoryPortalPageRepository::new()).await;
    }

    #[tokio::test]
    async fn test_returned_pages_are_copies() {
        let repo = MemoryPortalPageRepository::new();
        let mut page = conformance::page(1, "john-doe", &[1]);
        repo.create(&mut page).await.unwrap();

        let mut found = repo.find_by_id(page.id).await.unwrap();
        found.title = "changed".into();
        found.links.clear();

        let found = repo.find_by_id(page.id).await.unwrap();
        assert_eq!(found.title, "John's Page");
        assert_eq!(found.links.len(), 1);
    }
}
