//! Postgres store connector

use anyhow::{Context, Result};
use async_trait::async_trait;
use catalog_core::{
    Param, Product, ProductStatement, StoreConnector, StoreError, StoreResult, StoreRole,
};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

use crate::config::StoreSettings;

/// Row shape of the `products` table
#[derive(Debug, Clone, FromRow)]
struct DbProduct {
    id: i64,
    name: String,
    price_cents: i64,
    updated_at: DateTime<Utc>,
}

impl From<DbProduct> for Product {
    fn from(row: DbProduct) -> Self {
        Product {
            id: row.id,
            name: row.name,
            price_cents: row.price_cents,
            updated_at: row.updated_at,
        }
    }
}

/// Pooled connection to one Postgres instance
pub struct PgConnector {
    role: StoreRole,
    pool: PgPool,
}

impl PgConnector {
    /// Build the pool without connecting; connections open on first use so
    /// an unreachable replica does not prevent startup.
    pub fn connect_lazy(role: StoreRole, settings: &StoreSettings) -> Result<Self> {
        let options = PgConnectOptions::from_str(&settings.url)
            .with_context(|| format!("Invalid {} database URL", role))?;

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout())
            .connect_lazy_with(options);

        Ok(Self { role, pool })
    }

    /// Create the `products` table if it does not exist.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                price_cents BIGINT NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to migrate {} database", self.role))?;

        Ok(())
    }

    async fn fetch(&self, statement: &ProductStatement) -> StoreResult<Vec<Product>> {
        let sql = statement.sql();
        let mut query = sqlx::query_as::<_, DbProduct>(&sql);
        for param in statement.params() {
            query = match param {
                Param::Int(value) => query.bind(value),
                Param::Text(value) => query.bind(value),
            };
        }

        let rows = query.fetch_all(&self.pool).await.map_err(store_error)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}

#[async_trait]
impl StoreConnector for PgConnector {
    fn role(&self) -> StoreRole {
        self.role
    }

    async fn query(&self, statement: &ProductStatement) -> StoreResult<Vec<Product>> {
        if statement.is_write() {
            return Err(StoreError::Query(
                "write statement passed to query".to_string(),
            ));
        }
        self.fetch(statement).await
    }

    async fn execute(&self, statement: &ProductStatement) -> StoreResult<Vec<Product>> {
        if self.role == StoreRole::Replica && statement.is_write() {
            return Err(StoreError::Query(
                "replica connector is read-only".to_string(),
            ));
        }
        self.fetch(statement).await
    }
}

fn store_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Connectivity(e.to_string()),
        other => StoreError::Query(other.to_string()),
    }
}
