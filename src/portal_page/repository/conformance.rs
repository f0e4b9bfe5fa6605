//! Behavior every [`PortalPageRepository`] must share.
//!
//! PostgreSQL runs expect users 1 and 2 to exist.

use super::{PortalPageRepository, RepositoryError};
use crate::portal_page::{LinkParams, PortalPage, Theme};

pub fn page(user_id: i64, slug: &str, orders: &[i32]) -> PortalPage {
    let mut page = PortalPage::builder()
        .owner(user_id)
        .slug(slug)
        .title("John's Page")
        .bio(Some("Software developer".into()))
        .build();

    for order in orders {
        page.add_link(LinkParams {
            title: format!("Link {order}"),
            url: format!("https://example.com/{order}"),
            display_order: *order,
            ..Default::default()
        });
    }

    page
}

pub async fn create_assigns_ids(repo: &dyn PortalPageRepository) {
    let mut page = page(1, "john-doe", &[1, 2]);
    repo.create(&mut page).await.unwrap();

    assert!(page.id > 0);
    assert!(page.links.iter().all(|link| link.id > 0));
    assert!(page.links.iter().all(|link| link.portal_page_id == page.id));
    assert_ne!(page.links[0].id, page.links[1].id);

    let found = repo.find_by_id(page.id).await.unwrap();
    assert_eq!(found.slug, "john-doe");
    assert_eq!(found.bio, "Software developer");
    assert_eq!(found.theme, Theme::Light);
    assert_eq!(found.links.len(), 2);
}

pub async fn create_duplicate_slug(repo: &dyn PortalPageRepository) {
    repo.create(&mut page(1, "john-doe", &[])).await.unwrap();

    let err = repo.create(&mut page(2, "john-doe", &[])).await.unwrap_err();
    assert!(matches!(err, RepositoryError::UniqueViolation(_)));
}

pub async fn find_sorts_links(repo: &dyn PortalPageRepository) {
    let mut page = page(1, "john-doe", &[2, 1, 3]);
    repo.create(&mut page).await.unwrap();

    let by_slug = repo.find_by_slug("john-doe").await.unwrap();
    let orders = by_slug
        .links
        .iter()
        .map(|link| link.display_order)
        .collect::<Vec<_>>();
    assert_eq!(orders, vec![1, 2, 3]);

    let by_id = repo.find_by_id(page.id).await.unwrap();
    assert_eq!(by_id.links, by_slug.links);
}

pub async fn find_missing(repo: &dyn PortalPageRepository) {
    assert!(matches!(
        repo.find_by_slug("nobody").await,
        Err(RepositoryError::NotFound)
    ));
    assert!(matches!(
        repo.find_by_id(404).await,
        Err(RepositoryError::NotFound)
    ));
}

pub async fn update_reconciles_links(repo: &dyn PortalPageRepository) {
    let mut page = page(1, "john-doe", &[1, 2]);
    repo.create(&mut page).await.unwrap();
    let kept = page.links[0].clone();
    let removed = page.links[1].id;

    let mut changed = repo.find_by_id(page.id).await.unwrap();
    changed.title = "Updated".into();
    changed.links.clear();
    changed.add_link(LinkParams {
        id: kept.id,
        title: "Renamed".into(),
        url: kept.url.clone(),
        display_order: kept.display_order,
        ..Default::default()
    });
    changed.add_link(LinkParams {
        title: "New".into(),
        url: "https://example.com/new".into(),
        display_order: 3,
        ..Default::default()
    });
    repo.update(&mut changed).await.unwrap();

    let found = repo.find_by_id(page.id).await.unwrap();
    assert_eq!(found.title, "Updated");
    assert_eq!(found.links.len(), 2);
    assert!(found.links.iter().all(|link| link.id != removed));

    assert_eq!(found.links[0].id, kept.id);
    assert_eq!(found.links[0].title, "Renamed");
    assert_eq!(found.links[0].created_at, kept.created_at);

    assert!(found.links[1].id > 0);
    assert_ne!(found.links[1].id, kept.id);
    assert_eq!(found.links[1].display_order, 3);
    assert_eq!(changed.links[1].id, found.links[1].id);
}

pub async fn update_missing_page(repo: &dyn PortalPageRepository) {
    let mut page = page(1, "john-doe", &[]);
    page.id = 404;

    assert!(matches!(
        repo.update(&mut page).await,
        Err(RepositoryError::NotFound)
    ));
}

pub async fn update_slug(repo: &dyn PortalPageRepository) {
    let mut john = page(1, "john-doe", &[]);
    repo.create(&mut john).await.unwrap();
    repo.create(&mut page(2, "jane-doe", &[])).await.unwrap();

    // Same slug is not a collision.
    repo.update(&mut john).await.unwrap();

    john.slug = "jane-doe".into();
    assert!(matches!(
        repo.update(&mut john).await,
        Err(RepositoryError::UniqueViolation(_))
    ));

    john.slug = "johnny".into();
    repo.update(&mut john).await.unwrap();
    assert_eq!(repo.find_by_slug("johnny").await.unwrap().id, john.id);
    assert!(matches!(
        repo.find_by_slug("john-doe").await,
        Err(RepositoryError::NotFound)
    ));
}

pub async fn list_by_user_id(repo: &dyn PortalPageRepository) {
    let mut first = page(1, "first-page", &[1, 2]);
    repo.create(&mut first).await.unwrap();
    let mut second = page(1, "second-page", &[1]);
    repo.create(&mut second).await.unwrap();
    repo.create(&mut page(2, "other-page", &[])).await.unwrap();

    let pages = repo.list_by_user_id(1).await.unwrap();
    let ids = pages.iter().map(|page| page.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![first.id, second.id]);
    assert!(pages.iter().all(|page| page.links.is_empty()));

    assert!(repo.list_by_user_id(404).await.unwrap().is_empty());
}
