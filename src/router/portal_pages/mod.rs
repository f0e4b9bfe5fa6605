//! Portal page HTTP API.

mod create;
mod find;
mod list;
mod update;

use axum::routing::get;
use axum::{Router, middleware};
use serde::{Deserialize, Serialize};

use crate::portal_page::{Link, PortalPage};
use crate::{AppState, middleware as auth};

/// Link as exposed to clients.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkResponse {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub description: String,
    pub icon_url: String,
    pub display_order: i32,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            title: link.title,
            url: link.url,
            description: link.description,
            icon_url: link.icon_url,
            display_order: link.display_order,
        }
    }
}

/// Portal page with its ordered links.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct PortalPageResponse {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub bio: String,
    pub profile_image_url: String,
    pub theme: String,
    pub links: Vec<LinkResponse>,
}

impl From<PortalPage> for PortalPageResponse {
    fn from(page: PortalPage) -> Self {
        Self {
            id: page.id,
            slug: page.slug,
            title: page.title,
            bio: page.bio,
            profile_image_url: page.profile_image_url,
            theme: page.theme.to_string(),
            links: page.links.into_iter().map(LinkResponse::from).collect(),
        }
    }
}

/// Identifier returned on create and update.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: i64,
}

/// Routes under `/api/v1/me/portal-pages`. Authorization required.
pub fn owner_router(state: AppState) -> Router<AppState> {
    Router::new()
        // `GET /` goes to `list`, `POST /` goes to `create`.
        .route("/", get(list::handler).post(create::handler))
        // `GET /{id}` goes to `find`, `PUT /{id}` goes to `update`.
        .route("/{id}", get(find::by_id).put(update::handler))
        .route_layer(middleware::from_fn_with_state(state, auth::auth))
}

/// Routes under `/api/v1/portal-pages`.
pub fn public_router() -> Router<AppState> {
    // `GET /{slug}` goes to `find`.
    Router::new().route("/{slug}", get(find::by_slug))
}
