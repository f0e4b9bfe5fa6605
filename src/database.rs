//! PostgreSQL pool.

use sqlx::PgPool;
use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::config::Postgres;

pub const DEFAULT_CREDENTIALS: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "portal_link";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Clone)]
pub struct Database {
    pub postgres: PgPool,
}

impl Database {
    /// Init database connections.
    pub async fn new(config: &Postgres) -> Result<Self, sqlx::Error> {
        let database = config
            .database
            .as_deref()
            .unwrap_or(DEFAULT_DATABASE_NAME);

        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port.unwrap_or(DEFAULT_PORT))
            .username(config.username.as_deref().unwrap_or(DEFAULT_CREDENTIALS))
            .password(config.password.as_deref().unwrap_or(DEFAULT_CREDENTIALS))
            .database(database);

        if let Some(schema) = &config.schema {
            options = options.options([("search_path", schema)]);
        }

        let postgres = PgPoolOptions::new()
            .max_connections(config.pool_size.unwrap_or(DEFAULT_POOL_SIZE))
            .connect_with(options)
            .await?;

        if let Some(schema) = &config.schema {
            sqlx::query(&format!(r#"CREATE SCHEMA IF NOT EXISTS "{schema}""#))
                .execute(&postgres)
                .await?;
        }

        tracing::info!(host = %config.host, db = %database, "postgres connected");

        Ok(Self { postgres })
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!().run(&self.postgres).await
    }
}
