use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};

use super::PortalPageResponse;
use crate::AppState;
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::portal_page::usecase::{
    FindPortalPageById, FindPortalPageByIdParams, FindPortalPageBySlug,
};
use crate::router::PathParam;

/// Handler returning one of the caller's pages.
pub async fn by_id(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<PortalPageResponse>> {
    let page = FindPortalPageById::new(Arc::clone(&state.portal_pages))
        .execute(FindPortalPageByIdParams { user_id, id })
        .await?;

    Ok(Json(page.into()))
}

/// Public handler returning a page by slug.
pub async fn by_slug(
    State(state): State<AppState>,
    PathParam(slug): PathParam<String>,
) -> Result<Json<PortalPageResponse>> {
    let page = FindPortalPageBySlug::new(Arc::clone(&state.portal_pages))
        .execute(&slug)
        .await?;

    Ok(Json(page.into()))
}
