//! Store bootstrapping: database creation, pooled connection with retry, collection DDL.

use crate::config::ServerConfig;
use crate::dao::DaoError;
use crate::error::{AppError, ConfigError};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

/// Quote identifier for PostgreSQL (names come from validated resource config only).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Schema-qualified, quoted table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

/// Create the collection table for one resource if it does not exist.
pub async fn ensure_collection(pool: &PgPool, schema: &str, collection: &str) -> Result<(), DaoError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(schema)))
        .execute(pool)
        .await?;
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id TEXT PRIMARY KEY,
            doc JSONB NOT NULL,
            seq BIGSERIAL NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        qualified_table(schema, collection)
    );
    sqlx::query(&ddl).execute(pool).await?;
    tracing::debug!(schema = %schema, collection = %collection, "collection ready");
    Ok(())
}

/// Parse `DATABASE_URL` into connect options.
pub fn connect_options(database_url: &str) -> Result<PgConnectOptions, ConfigError> {
    PgConnectOptions::from_str(database_url).map_err(|e| ConfigError::InvalidSetting {
        key: "DATABASE_URL",
        value: e.to_string(),
    })
}

/// Same server, user and TLS settings, pointed at the `postgres` maintenance database.
fn admin_options(options: &PgConnectOptions) -> PgConnectOptions {
    options.clone().database("postgres")
}

/// Open the shared pool, retrying at a fixed interval until the server is reachable.
///
/// Each attempt first makes sure the target database exists. That step needs access to the
/// `postgres` database, so its failure is only logged: the pool connect decides the attempt.
pub async fn connect(config: &ServerConfig) -> Result<PgPool, AppError> {
    let options = connect_options(&config.database_url)?;
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        if let Err(e) = ensure_database_exists(&options).await {
            tracing::warn!(attempt, error = %e, "could not check target database");
        }
        match PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect_with(options.clone())
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(e) if attempt < config.db_connect_retries => {
                tracing::warn!(attempt, error = %e, "database connection failed, retrying");
                tokio::time::sleep(config.db_retry_interval).await;
            }
            Err(e) => return Err(AppError::from(e)),
        }
    }
}

/// Create the target database when it does not exist.
pub async fn ensure_database_exists(options: &PgConnectOptions) -> Result<(), sqlx::Error> {
    let db_name = match options.get_database() {
        Some(name) if !name.is_empty() && name != "postgres" => name.to_string(),
        _ => return Ok(()),
    };
    let mut conn = admin_options(options).connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgSslMode;
    use std::time::{Duration, Instant};

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quoted("role"), "\"role\"");
        assert_eq!(quoted("a\"b"), "\"a\"\"b\"");
        assert_eq!(qualified_table("public", "role"), "\"public\".\"role\"");
    }

    #[test]
    fn admin_connection_keeps_url_parameters() {
        let options = connect_options("postgres://u:p@db.internal:5433/cms?sslmode=require").unwrap();
        assert_eq!(options.get_database(), Some("cms"));
        let admin = admin_options(&options);
        assert_eq!(admin.get_database(), Some("postgres"));
        assert_eq!(admin.get_host(), "db.internal");
        assert_eq!(admin.get_port(), 5433);
        assert!(matches!(admin.get_ssl_mode(), PgSslMode::Require));
    }

    #[test]
    fn invalid_url_is_a_config_error() {
        assert!(matches!(
            connect_options("not a url"),
            Err(ConfigError::InvalidSetting { key: "DATABASE_URL", .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_server_is_retried_before_giving_up() {
        let config = ServerConfig {
            database_url: "postgres://u:p@127.0.0.1:1/cms".into(),
            db_connect_retries: 4,
            db_retry_interval: Duration::from_millis(100),
            db_acquire_timeout: Duration::from_millis(100),
            ..ServerConfig::default()
        };
        let started = Instant::now();
        let result = connect(&config).await;
        assert!(matches!(result, Err(AppError::Store(_))));
        // three sleeps between four attempts
        assert!(started.elapsed() >= Duration::from_millis(300));
    }
}
