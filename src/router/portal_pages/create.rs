use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use super::IdResponse;
use crate::AppState;
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::portal_page::usecase::{CreatePortalPage, CreatePortalPageParams};
use crate::router::JsonBody;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Body {
    slug: String,
    title: String,
    bio: Option<String>,
    profile_image_url: Option<String>,
    theme: Option<String>,
}

/// Handler to create a portal page owned by the caller.
pub async fn handler(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    JsonBody(body): JsonBody<Body>,
) -> Result<(StatusCode, Json<IdResponse>)> {
    let page = CreatePortalPage::new(Arc::clone(&state.portal_pages))
        .execute(CreatePortalPageParams {
            user_id,
            slug: body.slug,
            title: body.title,
            bio: body.bio,
            profile_image_url: body.profile_image_url,
            theme: body.theme,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(IdResponse { id: page.id })))
}
