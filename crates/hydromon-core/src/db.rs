use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, Pool, Postgres, Row};

use crate::config::DatabaseConfig;

pub type DbPool = Pool<Postgres>;

/// Tables the loaders write to. The environment check refuses to run
/// against a database missing any of them.
pub const REQUIRED_TABLES: &[&str] = &[
    "location",
    "data_logger",
    "sensor",
    "measuring_point",
    "location_attachment",
    "measuring_point_attachment",
    "coded_value_domain",
    "coded_value",
];

/// Establish a Postgres connection pool sized by the `[database]` config.
pub async fn connect(database_url: &str, config: &DatabaseConfig) -> Result<DbPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
        .with_context(|| "failed to connect to Postgres")
}

/// Run database migrations embedded at compile-time.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .with_context(|| "failed to run database migrations")
}

/// Domains among `expected` with no row in `coded_value`.
pub async fn unseeded_domains<'a>(
    pool: &DbPool,
    expected: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<String>> {
    let seeded: Vec<String> =
        sqlx::query_scalar::<_, String>("SELECT DISTINCT domain_name FROM coded_value")
            .fetch_all(pool)
            .await
            .with_context(|| "failed to list seeded domains")?;

    Ok(expected
        .into_iter()
        .filter(|domain| !seeded.iter().any(|name| name == domain))
        .map(str::to_string)
        .collect())
}

/// Names from `REQUIRED_TABLES` that do not exist in the current schema.
pub async fn missing_tables(pool: &DbPool) -> Result<Vec<String>> {
    let rows = sqlx::query(
        r#"
            SELECT table_name::text AS table_name
            FROM information_schema.tables
            WHERE table_schema = current_schema()
        "#,
    )
    .fetch_all(pool)
    .await
    .with_context(|| "failed to list tables")?;

    let mut present = Vec::with_capacity(rows.len());
    for row in rows {
        present.push(row.try_get::<String, _>("table_name")?);
    }

    Ok(REQUIRED_TABLES
        .iter()
        .filter(|table| !present.iter().any(|name| name == *table))
        .map(|table| table.to_string())
        .collect())
}
