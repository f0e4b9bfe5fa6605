//! Error handler for portal-link.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors produced by use cases.
///
/// Each variant has a stable `code` exposed to API clients.
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    #[error("slug already exists")]
    SlugExists,
    #[error("email already exists")]
    EmailExists,
    #[error("portal page not found")]
    PortalPageNotFound,
    #[error("link not found, link ID: {0}")]
    LinkNotFound(i64),
    #[error("you do not have permission to access this portal page")]
    Unauthorized,
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("internal server error")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl ApplicationError {
    pub fn internal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal(Box::new(err))
    }

    /// Stable error code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidParams(_) => "ErrInvalidParams",
            Self::SlugExists => "ErrSlugExists",
            Self::EmailExists => "ErrEmailExists",
            Self::PortalPageNotFound => "ErrPortalPageNotFound",
            Self::LinkNotFound(_) => "ErrNotFound",
            Self::Unauthorized => "ErrForbidden",
            Self::InvalidCredentials => "ErrInvalidCredentials",
            Self::Internal(_) => "ErrInternal",
        }
    }

    /// HTTP status matching the error kind.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidParams(_) | Self::SlugExists | Self::EmailExists => {
                StatusCode::BAD_REQUEST
            },
            Self::PortalPageNotFound | Self::LinkNotFound(_) => {
                StatusCode::NOT_FOUND
            },
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for ApplicationError {
    fn from(errors: ValidationErrors) -> Self {
        Self::InvalidParams(first_violation(&errors))
    }
}

/// Errors returned by repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("unique constraint `{0}` violated")]
    UniqueViolation(String),
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Self::UniqueViolation(db.constraint().unwrap_or_default().to_owned())
            },
            err => Self::Database(err),
        }
    }
}

/// Use cases translate `NotFound` and `UniqueViolation` themselves.
impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        ApplicationError::internal(err)
    }
}

/// Box any unexpected error into [`ApplicationError::Internal`].
pub trait ToInternal<T> {
    fn catch(self) -> std::result::Result<T, ApplicationError>;
}

impl<T, E> ToInternal<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn catch(self) -> std::result::Result<T, ApplicationError> {
        self.map_err(ApplicationError::internal)
    }
}

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Application(#[from] ApplicationError),

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Path(#[from] PathRejection),

    #[error("invalid access token")]
    Unauthorized,
}

/// JSON body sent on every failure.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    code: String,
    message: String,
    #[serde(skip)]
    status: u16,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `code` field.
    pub fn code(mut self, code: &str) -> Self {
        self.code = code.into();
        self
    }

    /// Update `message` field.
    pub fn message(mut self, message: &str) -> Self {
        self.message = message.into();
        self
    }

    /// Transform [`ResponseError`] into axum [`Response`].
    pub fn into_response(self) -> std::result::Result<Response, axum::http::Error> {
        if let Ok(body) = serde_json::to_string(&self) {
            Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            code: "ErrInternal".to_owned(),
            message: "Internal server error".to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        }
    }
}

/// Pick a deterministic, human-readable reason out of validation errors.
fn first_violation(errors: &ValidationErrors) -> String {
    let mut fields = errors.field_errors().into_iter().collect::<Vec<_>>();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .into_iter()
        .find_map(|(field, issues)| {
            issues.first().map(|issue| match &issue.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .unwrap_or_else(|| "invalid parameters".to_owned())
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = ResponseError::default();

        let response = match &self {
            ServerError::Application(ApplicationError::Internal(source)) => {
                tracing::error!(err = %source, "server returned 500 status");
                response
            },
            ServerError::Application(err) => response
                .code(err.code())
                .message(&err.to_string())
                .status(err.status()),
            ServerError::Json(err) => response
                .code("ErrInvalidParams")
                .message(&err.body_text())
                .status(StatusCode::BAD_REQUEST),
            ServerError::Path(err) => response
                .code("ErrInvalidParams")
                .message(&err.body_text())
                .status(StatusCode::BAD_REQUEST),
            ServerError::Unauthorized => response
                .code("ErrUnauthorized")
                .message("Invalid access token")
                .status(StatusCode::UNAUTHORIZED),
        };

        response
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(
            serde_json::json!({
                "code": "ErrInternal",
                "message": "Internal server error",
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}

#[cfg(test)]
mod tests {
    use validator::ValidationError;

    use super::*;

    #[test]
    fn test_first_violation_is_sorted_by_field() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "title",
            ValidationError::new("length").with_message("title is too long".into()),
        );
        errors.add(
            "bio",
            ValidationError::new("length").with_message("bio is too long".into()),
        );

        match ApplicationError::from(errors) {
            ApplicationError::InvalidParams(reason) => {
                assert_eq!(reason, "bio is too long")
            },
            err => panic!("unexpected error: {err:?}"),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApplicationError::SlugExists.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApplicationError::PortalPageNotFound.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApplicationError::Unauthorized.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApplicationError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApplicationError::Unauthorized.code(), "ErrForbidden");
    }
}
