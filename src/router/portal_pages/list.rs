use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::portal_page::usecase::{ListPortalPages, PortalPageSummary};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub id: i64,
    pub slug: String,
    pub title: String,
}

impl From<PortalPageSummary> for Summary {
    fn from(summary: PortalPageSummary) -> Self {
        Self {
            id: summary.id,
            slug: summary.slug,
            title: summary.title,
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub portal_pages: Vec<Summary>,
}

/// Handler listing the caller's pages.
pub async fn handler(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<Response>> {
    let pages = ListPortalPages::new(Arc::clone(&state.portal_pages))
        .execute(user_id)
        .await?;

    Ok(Json(Response {
        portal_pages: pages.into_iter().map(Summary::from).collect(),
    }))
}
