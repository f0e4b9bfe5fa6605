use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;

use super::IdResponse;
use crate::AppState;
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::portal_page::LinkParams;
use crate::portal_page::usecase::{UpdatePortalPage, UpdatePortalPageParams};
use crate::router::{JsonBody, PathParam};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LinkBody {
    id: i64,
    title: String,
    url: String,
    description: Option<String>,
    icon_url: Option<String>,
    display_order: i32,
}

impl From<LinkBody> for LinkParams {
    fn from(link: LinkBody) -> Self {
        Self {
            id: link.id,
            title: link.title,
            url: link.url,
            description: link.description.unwrap_or_default(),
            icon_url: link.icon_url.unwrap_or_default(),
            display_order: link.display_order,
        }
    }
}

/// Absent fields are left unchanged, except `links` which is required and
/// replaces the stored links.
#[derive(Debug, Deserialize)]
pub struct Body {
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    profile_image_url: Option<String>,
    #[serde(default)]
    theme: Option<String>,
    links: Vec<LinkBody>,
}

/// Handler to update one of the caller's pages.
pub async fn handler(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<Body>,
) -> Result<Json<IdResponse>> {
    let page = UpdatePortalPage::new(Arc::clone(&state.portal_pages))
        .execute(UpdatePortalPageParams {
            id,
            user_id,
            slug: body.slug,
            title: body.title,
            bio: body.bio,
            profile_image_url: body.profile_image_url,
            theme: body.theme,
            links: body.links.into_iter().map(LinkParams::from).collect(),
        })
        .await?;

    Ok(Json(IdResponse { id: page.id }))
}
