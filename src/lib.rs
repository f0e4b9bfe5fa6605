//! portal-link serves link-in-bio pages: users sign up, build pages made of
//! ordered links and share them under a public slug.

#![forbid(unsafe_code)]
mod crypto;
mod database;
pub mod error;
mod middleware;
pub mod portal_page;
mod router;
pub mod telemetry;
mod token;
pub mod user;

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{Method, StatusCode, header};
use axum::routing::{get, post};
use axum::{Router, middleware as AxumMiddleware};
use metrics_exporter_prometheus::PrometheusHandle;
use portal_page::repository::{
    MemoryPortalPageRepository, PgPortalPageRepository, PortalPageRepository,
};
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use user::{MemoryUserRepository, PgUserRepository, UserRepository};

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    let mut request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    app.oneshot(request.body(axum::body::Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub portal_pages: Arc<dyn PortalPageRepository>,
    pub users: Arc<dyn UserRepository>,
    pub crypto: Arc<crypto::PasswordManager>,
    pub token: token::TokenManager,
    /// Present when the Prometheus recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(10)))
        // Remove sensitive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
                .allow_headers(Any)
                .vary([header::AUTHORIZATION]),
        );

    let api = Router::new()
        // `POST /api/v1/user/signup` goes to `sign_up`.
        .route("/user/signup", post(router::user::sign_up))
        // `POST /api/v1/user/signin` goes to `sign_in`.
        .route("/user/signin", post(router::user::sign_in))
        .nest(
            "/me/portal-pages",
            router::portal_pages::owner_router(state.clone()),
        )
        .nest("/portal-pages", router::portal_pages::public_router());

    Router::new()
        // `GET /status.json` goes to `status`.
        .route("/status.json", get(router::status::status))
        // `GET /metrics` goes to the Prometheus handle.
        .route("/metrics", get(router::metrics::handler))
        .nest("/api/v1", api)
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Initialize the application state.
///
/// Uses PostgreSQL when configured and applies migrations, otherwise keeps
/// everything in memory.
pub async fn initialize_state(
    config: Arc<config::Configuration>,
    metrics: Option<PrometheusHandle>,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let (portal_pages, users): (
        Arc<dyn PortalPageRepository>,
        Arc<dyn UserRepository>,
    ) = match &config.postgres {
        Some(postgres) => {
            let db = database::Database::new(postgres).await?;
            // execute migrations scripts on start.
            db.migrate().await?;

            (
                Arc::new(PgPortalPageRepository::new(db.postgres.clone())),
                Arc::new(PgUserRepository::new(db.postgres)),
            )
        },
        None => {
            tracing::warn!(
                "missing `postgres` entry on `config.yaml` file, data is kept in memory"
            );
            (
                Arc::new(MemoryPortalPageRepository::new()),
                Arc::new(MemoryUserRepository::new()),
            )
        },
    };

    let crypto = Arc::new(crypto::PasswordManager::new(config.argon2.clone())?);

    // handle jwt.
    let Some(secret) = config.token.as_ref().map(|token| token.secret.as_str())
    else {
        return Err("missing `token` entry on `config.yaml` file".into());
    };
    let token = token::TokenManager::new(secret)?;

    Ok(AppState {
        config,
        portal_pages,
        users,
        crypto,
        token,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_in_memory() {
        let config = config::Configuration::default().override_with(|key| {
            (key == "TOKEN_SECRET").then(|| "secret".to_owned())
        });

        let state = initialize_state(Arc::new(config), None).await.unwrap();
        assert!(state.metrics.is_none());
        assert_eq!(state.token.decode(&state.token.create(1).unwrap()).unwrap().user_id, 1);
    }

    #[tokio::test]
    async fn test_initialize_without_secret() {
        let config = Arc::new(config::Configuration::default());
        assert!(initialize_state(config, None).await.is_err());
    }
}
