//! PostgreSQL implementation for portal page repository.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};

use super::{PortalPageRepository, RepositoryError, Result};
use crate::portal_page::{Link, PortalPage};

const SLUG_CONSTRAINT: &str = "portal_pages_slug_key";

/// Portal page as stored in the database.
#[derive(Debug, Clone, FromRow)]
struct PortalPageRecord {
    id: i64,
    user_id: i64,
    slug: String,
    title: String,
    bio: String,
    profile_image_url: String,
    theme: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Link as stored in the database.
#[derive(Debug, Clone, FromRow)]
struct LinkRecord {
    id: i64,
    portal_page_id: i64,
    title: String,
    url: String,
    description: String,
    icon_url: String,
    display_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PortalPageRecord {
    fn into_page(self, links: Vec<LinkRecord>) -> PortalPage {
        PortalPage {
            id: self.id,
            user_id: self.user_id,
            slug: self.slug,
            title: self.title,
            bio: self.bio,
            profile_image_url: self.profile_image_url,
            // `theme` column is constrained to known values.
            theme: self.theme.parse().unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            links: links.into_iter().map(Link::from).collect(),
        }
    }
}

impl From<LinkRecord> for Link {
    fn from(record: LinkRecord) -> Self {
        Self {
            id: record.id,
            portal_page_id: record.portal_page_id,
            title: record.title,
            url: record.url,
            description: record.description,
            icon_url: record.icon_url,
            display_order: record.display_order,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// PostgreSQL portal page repository.
pub struct PgPortalPageRepository {
    pool: PgPool,
}

impl PgPortalPageRepository {
    /// Create a new [`PgPortalPageRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_links(&self, portal_page_id: i64) -> Result<Vec<LinkRecord>> {
        let links = sqlx::query_as::<_, LinkRecord>(
            r#"
            SELECT
                id, portal_page_id, title, url, description, icon_url,
                display_order, created_at, updated_at
            FROM links
            WHERE portal_page_id = $1
            ORDER BY display_order ASC, id ASC
            "#,
        )
        .bind(portal_page_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }
}

async fn insert_page(conn: &mut PgConnection, page: &mut PortalPage) -> Result<()> {
    let (id, created_at, updated_at) =
        sqlx::query_as::<_, (i64, DateTime<Utc>, DateTime<Utc>)>(
            r#"
            INSERT INTO portal_pages (
                user_id, slug, title, bio, profile_image_url, theme
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, created_at, updated_at
            "#,
        )
        .bind(page.user_id)
        .bind(&page.slug)
        .bind(&page.title)
        .bind(&page.bio)
        .bind(&page.profile_image_url)
        .bind(page.theme.as_str())
        .fetch_one(&mut *conn)
        .await?;

    page.id = id;
    page.created_at = created_at;
    page.updated_at = updated_at;

    for link in page.links.iter_mut() {
        link.portal_page_id = id;
        insert_link(conn, link).await?;
    }

    Ok(())
}

async fn insert_link(conn: &mut PgConnection, link: &mut Link) -> Result<()> {
    let (id, created_at, updated_at) =
        sqlx::query_as::<_, (i64, DateTime<Utc>, DateTime<Utc>)>(
            r#"
            INSERT INTO links (
                portal_page_id, title, url, description, icon_url, display_order
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, created_at, updated_at
            "#,
        )
        .bind(link.portal_page_id)
        .bind(&link.title)
        .bind(&link.url)
        .bind(&link.description)
        .bind(&link.icon_url)
        .bind(link.display_order)
        .fetch_one(&mut *conn)
        .await?;

    link.id = id;
    link.created_at = created_at;
    link.updated_at = updated_at;

    Ok(())
}

async fn update_link(
    conn: &mut PgConnection,
    link: &mut Link,
    created_at: DateTime<Utc>,
) -> Result<()> {
    let updated_at = sqlx::query_scalar::<_, DateTime<Utc>>(
        r#"
        UPDATE links
        SET
            title = $2,
            url = $3,
            description = $4,
            icon_url = $5,
            display_order = $6,
            updated_at = NOW()
        WHERE id = $1
        RETURNING updated_at
        "#,
    )
    .bind(link.id)
    .bind(&link.title)
    .bind(&link.url)
    .bind(&link.description)
    .bind(&link.icon_url)
    .bind(link.display_order)
    .fetch_one(&mut *conn)
    .await?;

    link.created_at = created_at;
    link.updated_at = updated_at;

    Ok(())
}

async fn update_page(conn: &mut PgConnection, page: &mut PortalPage) -> Result<()> {
    let (user_id, slug, created_at) =
        sqlx::query_as::<_, (i64, String, DateTime<Utc>)>(
            "SELECT user_id, slug, created_at FROM portal_pages WHERE id = $1 FOR UPDATE",
        )
        .bind(page.id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    if slug != page.slug {
        let taken = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM portal_pages WHERE slug = $1 AND id <> $2",
        )
        .bind(&page.slug)
        .bind(page.id)
        .fetch_optional(&mut *conn)
        .await?;

        if taken.is_some() {
            return Err(RepositoryError::UniqueViolation(SLUG_CONSTRAINT.into()));
        }
    }

    let updated_at = sqlx::query_scalar::<_, DateTime<Utc>>(
        r#"
        UPDATE portal_pages
        SET
            slug = $2,
            title = $3,
            bio = $4,
            profile_image_url = $5,
            theme = $6,
            updated_at = NOW()
        WHERE id = $1
        RETURNING updated_at
        "#,
    )
    .bind(page.id)
    .bind(&page.slug)
    .bind(&page.title)
    .bind(&page.bio)
    .bind(&page.profile_image_url)
    .bind(page.theme.as_str())
    .fetch_one(&mut *conn)
    .await?;

    page.user_id = user_id;
    page.created_at = created_at;
    page.updated_at = updated_at;

    let stored = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
        "SELECT id, created_at FROM links WHERE portal_page_id = $1",
    )
    .bind(page.id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .collect::<HashMap<_, _>>();

    let mut kept = HashSet::new();
    for link in page.links.iter_mut() {
        link.portal_page_id = page.id;

        match stored.get(&link.id) {
            Some(created_at) if kept.insert(link.id) => {
                update_link(conn, link, *created_at).await?
            },
            _ => insert_link(conn, link).await?,
        }
    }

    let kept = kept.into_iter().collect::<Vec<_>>();
    let deleted = sqlx::query(
        "DELETE FROM links WHERE portal_page_id = $1 AND NOT (id = ANY($2))",
    )
    .bind(page.id)
    .bind(&kept)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    tracing::debug!(
        portal_page_id = page.id,
        kept = kept.len(),
        deleted,
        "links reconciled"
    );

    Ok(())
}

#[async_trait]
impl PortalPageRepository for PgPortalPageRepository {
    async fn create(&self, page: &mut PortalPage) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        match insert_page(&mut *tx, page).await {
            Ok(()) => {
                tx.commit().await?;
                Ok(())
            },
            Err(err) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(err = %rollback, "rollback failed");
                }
                Err(err)
            },
        }
    }

    async fn update(&self, page: &mut PortalPage) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        match update_page(&mut *tx, page).await {
            Ok(()) => {
                tx.commit().await?;
                Ok(())
            },
            Err(err) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(err = %rollback, "rollback failed");
                }
                Err(err)
            },
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<PortalPage> {
        let record = sqlx::query_as::<_, PortalPageRecord>(
            r#"
            SELECT
                id, user_id, slug, title, bio, profile_image_url, theme,
                created_at, updated_at
            FROM portal_pages
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;

        let links = self.find_links(record.id).await?;
        Ok(record.into_page(links))
    }

    async fn find_by_id(&self, id: i64) -> Result<PortalPage> {
        let record = sqlx::query_as::<_, PortalPageRecord>(
            r#"
            SELECT
                id, user_id, slug, title, bio, profile_image_url, theme,
                created_at, updated_at
            FROM portal_pages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        let links = self.find_links(record.id).await?;
        Ok(record.into_page(links))
    }

    async fn list_by_user_id(&self, user_id: i64) -> Result<Vec<PortalPage>> {
        let records = sqlx::query_as::<_, PortalPageRecord>(
            r#"
            SELECT
                id, user_id, slug, title, bio, profile_image_url, theme,
                created_at, updated_at
            FROM portal_pages
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records
            .into_iter()
            .map(|record| record.into_page(Vec::new()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use sqlx::{Pool, Postgres};

    use super::super::conformance;
    use super::*;

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_create_assigns_ids(pool: Pool<Postgres>) {
        conformance::create_assigns_ids(&PgPortalPageRepository::new(pool)).await;
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_create_duplicate_slug(pool: Pool<Postgres>) {
        conformance::create_duplicate_slug(&PgPortalPageRepository::new(pool))
            .await;
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_find_sorts_links(pool: Pool<Postgres>) {
        conformance::find_sorts_links(&PgPortalPageRepository::new(pool)).await;
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_find_missing(pool: Pool<Postgres>) {
        conformance::find_missing(&PgPortalPageRepository::new(pool)).await;
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_update_reconciles_links(pool: Pool<Postgres>) {
        conformance::update_reconciles_links(&PgPortalPageRepository::new(pool))
            .await;
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_update_missing_page(pool: Pool<Postgres>) {
        conformance::update_missing_page(&PgPortalPageRepository::new(pool))
            .await;
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_update_slug(pool: Pool<Postgres>) {
        conformance::update_slug(&PgPortalPageRepository::new(pool)).await;
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_list_by_user_id(pool: Pool<Postgres>) {
        conformance::list_by_user_id(&PgPortalPageRepository::new(pool)).await;
    }
}
