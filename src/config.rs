//! Configuration manager for portal-link.
//!
//! Values come from `config.yaml` and are overridden by environment
//! variables (including those loaded from `.env`).

use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};

use crate::AppState;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Listening port.
    pub port: u16,
    /// Default tracing filter, used when `RUST_LOG` is unset.
    pub log_level: String,
    #[serde(skip_deserializing)]
    pub version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to JsonWebToken configuration.
    #[serde(skip_serializing)]
    pub token: Option<Token>,
    /// Related to PostgreSQL configuration.
    /// Portal pages are kept in memory when missing.
    #[serde(skip_serializing)]
    pub postgres: Option<Postgres>,
    /// Related to Argon2 configuration.
    #[serde(skip_serializing)]
    pub argon2: Option<Argon2>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_owned(),
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_owned(),
            version: VERSION.to_owned(),
            path: PathBuf::default(),
            token: None,
            postgres: None,
            argon2: None,
        }
    }
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Postgres {
    /// Hostname of PostgreSQL instance.
    pub host: String,
    pub port: Option<u16>,
    /// Database name.
    pub database: Option<String>,
    /// Schema used as `search_path`.
    pub schema: Option<String>,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

/// Argon2 configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Argon2 {
    /// Memory used while hashing, in KiB.
    pub memory_cost: u32,
    /// Iterations of hash.
    pub iterations: u32,
    /// Parallelism degree.
    pub parallelism: u32,
    /// Output hash length.
    pub hash_length: usize,
}

impl Default for Argon2 {
    fn default() -> Self {
        Self {
            memory_cost: 1024 * 64, // 64 MiB.
            iterations: 4,
            parallelism: 2,
            hash_length: 32,
        }
    }
}

/// Json Web Token configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Token {
    /// HS256 shared secret.
    pub secret: String,
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

/// Errors while reading `config.yaml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot open `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Configuration {
    /// Read from `path` instead of `config.yaml`.
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    ///
    /// Environment overrides are not applied, see [`Configuration::with_env`].
    pub fn read(self) -> Result<Self, ConfigError> {
        let file_path = if self.path.as_os_str().is_empty() {
            Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        } else {
            self.path
        };

        let file = File::open(&file_path).map_err(|source| ConfigError::Io {
            path: file_path.clone(),
            source,
        })?;
        let config = serde_yaml::from_reader::<_, Configuration>(file)?;

        Ok(Self {
            version: VERSION.to_owned(),
            path: file_path,
            ..config
        })
    }

    /// Apply overrides from the process environment and share the result.
    pub fn with_env(self) -> Arc<Self> {
        Arc::new(self.override_with(|key| std::env::var(key).ok()))
    }

    /// Apply `PORT`, `LOG_LEVEL`, `TOKEN_SECRET` and `DB_*` overrides.
    ///
    /// `DB_HOST` alone is enough to enable PostgreSQL.
    pub fn override_with<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = parse(&var, "PORT") {
            self.port = port;
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(secret) = var("TOKEN_SECRET") {
            self.token = Some(Token { secret });
        }

        if let Some(host) = var("DB_HOST") {
            self.postgres.get_or_insert_with(Postgres::default).host = host;
        }
        if let Some(postgres) = self.postgres.as_mut() {
            if let Some(port) = parse(&var, "DB_PORT") {
                postgres.port = Some(port);
            }
            if let Some(database) = var("DB_NAME") {
                postgres.database = Some(database);
            }
            if let Some(schema) = var("DB_SCHEMA") {
                postgres.schema = Some(schema);
            }
            if let Some(username) = var("DB_USER") {
                postgres.username = Some(username);
            }
            if let Some(password) = var("DB_PASSWORD") {
                postgres.password = Some(password);
            }
            if let Some(pool_size) = parse(&var, "DB_POOL_SIZE") {
                postgres.pool_size = Some(pool_size);
            }
        }

        self
    }
}

fn parse<T, F>(var: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let value = var(key)?;
    match value.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(%key, %value, "ignoring invalid environment variable");
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const CONFIG: &str = r#"
name: links
port: 3000
token:
  secret: yaml-secret
postgres:
  host: localhost
  database: portal
"#;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_parse_yaml() {
        let config: Configuration = serde_yaml::from_str(CONFIG).unwrap();

        assert_eq!(config.name, "links");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.token.unwrap().secret, "yaml-secret");
        let postgres = config.postgres.unwrap();
        assert_eq!(postgres.host, "localhost");
        assert_eq!(postgres.database.as_deref(), Some("portal"));
        assert_eq!(postgres.pool_size, None);
        assert_eq!(config.argon2, None);
    }

    #[test]
    fn test_environment_overrides() {
        let config: Configuration = serde_yaml::from_str(CONFIG).unwrap();
        let config = config.override_with(env(&[
            ("PORT", "9000"),
            ("TOKEN_SECRET", "env-secret"),
            ("DB_NAME", "other"),
            ("DB_POOL_SIZE", "not a number"),
        ]));

        assert_eq!(config.port, 9000);
        assert_eq!(config.token.unwrap().secret, "env-secret");
        let postgres = config.postgres.unwrap();
        assert_eq!(postgres.host, "localhost");
        assert_eq!(postgres.database.as_deref(), Some("other"));
        assert_eq!(postgres.pool_size, None);
    }

    #[test]
    fn test_db_host_enables_postgres() {
        let config = Configuration::default().override_with(env(&[("DB_USER", "admin")]));
        assert_eq!(config.postgres, None);

        let config = Configuration::default().override_with(env(&[
            ("DB_HOST", "db"),
            ("DB_PORT", "5433"),
            ("DB_SCHEMA", "links"),
        ]));
        let postgres = config.postgres.unwrap();
        assert_eq!(postgres.host, "db");
        assert_eq!(postgres.port, Some(5433));
        assert_eq!(postgres.schema.as_deref(), Some("links"));
    }

    #[test]
    fn test_read_file() {
        let path = std::env::temp_dir().join("portal-link-test-config.yaml");
        std::fs::write(&path, CONFIG).unwrap();

        let config = Configuration::default().path(path.clone()).read().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.name, "links");
        assert_eq!(config.version, VERSION);
        assert_eq!(config.token.unwrap().secret, "yaml-secret");
    }

    #[test]
    fn test_read_missing_file() {
        let path = std::env::temp_dir().join("portal-link-missing-config.yaml");

        let err = Configuration::default().path(path).read().unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_defaults() {
        let config = Configuration::default().override_with(env(&[]));

        assert_eq!(config.name, "portal-link");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.version, VERSION);
        assert_eq!(config.token, None);
    }
}
