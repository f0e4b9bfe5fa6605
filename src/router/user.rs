//! Account registration and authentication.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::Result;
use crate::router::JsonBody;
use crate::user::{AccessToken, SignIn, SignInParams, SignUp, SignUpParams};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignUpBody {
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignInBody {
    email: String,
    password: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub access_token: String,
}

impl From<AccessToken> for Response {
    fn from(token: AccessToken) -> Self {
        Self {
            access_token: token.access_token,
        }
    }
}

/// Handler to create an account.
pub async fn sign_up(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SignUpBody>,
) -> Result<Json<Response>> {
    let token = SignUp::new(
        Arc::clone(&state.users),
        Arc::clone(&state.crypto),
        state.token.clone(),
    )
    .execute(SignUpParams {
        name: body.name,
        email: body.email,
        password: body.password,
    })
    .await?;

    Ok(Json(token.into()))
}

/// Handler to exchange credentials for an access token.
pub async fn sign_in(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SignInBody>,
) -> Result<Json<Response>> {
    let token = SignIn::new(
        Arc::clone(&state.users),
        Arc::clone(&state.crypto),
        state.token.clone(),
    )
    .execute(SignInParams {
        email: body.email,
        password: body.password,
    })
    .await?;

    Ok(Json(token.into()))
}
