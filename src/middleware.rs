//! Middlewares for routes.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::AppState;
use crate::error::{ApplicationError, RepositoryError, ServerError};

const BEARER: &str = "Bearer ";

/// Id of the authenticated caller, inserted by [`auth`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser(pub i64);

/// Custom middleware for authentification.
///
/// Requires `Authorization: Bearer <token>` with a valid signature, a
/// future expiry and an existing user.
pub async fn auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix(BEARER))
        .ok_or(ServerError::Unauthorized)?;

    let claims = state.token.decode(token).map_err(|err| {
        tracing::debug!(%err, "rejected access token");
        ServerError::Unauthorized
    })?;

    match state.users.find_by_id(claims.user_id).await {
        Ok(_) => {},
        Err(RepositoryError::NotFound) => {
            tracing::debug!(user_id = claims.user_id, "token of an unknown user");
            return Err(ServerError::Unauthorized);
        },
        Err(err) => return Err(ApplicationError::from(err).into()),
    }

    req.extensions_mut().insert(AuthUser(claims.user_id));
    Ok(next.run(req).await)
}
