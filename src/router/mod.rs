//! HTTP handlers.

pub mod metrics;
pub mod portal_pages;
pub mod status;
pub mod user;

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ServerError;

/// JSON body whose rejections render as [`ServerError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct JsonBody<T>(pub T);

/// Path parameters whose rejections render as [`ServerError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ServerError))]
pub struct PathParam<T>(pub T);
