//! PostgreSQL connection implementation.
//!
//! This module implements the `CatalogConnection` trait for PostgreSQL
//! using SQLx's PgPool.

use async_lock::RwLock;
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::{debug, error, info};

use super::types::PgValueConverter;
use crate::error::{HarvestError, HarvestResult};
use crate::services::database::traits::{
    BoxedConnection, CatalogConnection, Credentials, Dialect, RawRow,
};

/// PostgreSQL catalog connection.
///
/// This struct wraps a SQLx PgPool and implements the `CatalogConnection` trait.
pub struct PostgresConnection {
    pool: RwLock<Option<PgPool>>,
}

impl std::fmt::Debug for PostgresConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConnection")
            .field("pool", &"<PgPool>")
            .finish()
    }
}

impl Default for PostgresConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl PostgresConnection {
    /// Create a new, unconnected PostgreSQL connection.
    pub fn new() -> Self {
        Self {
            pool: RwLock::new(None),
        }
    }

    /// Create a boxed connection (for factory use).
    pub fn boxed() -> BoxedConnection {
        Box::new(Self::new())
    }

    /// Build PgConnectOptions from the credentials.
    ///
    /// Host and port are required. Absent user, password or database are
    /// left for the server to reject.
    pub(crate) fn build_connect_options(credentials: &Credentials) -> HarvestResult<PgConnectOptions> {
        let host = credentials.host(Dialect::PostgreSQL)?;
        let port = credentials.port(Dialect::PostgreSQL)?;

        let mut options = PgConnectOptions::new().host(host).port(port);
        if let Some(user) = &credentials.user {
            options = options.username(user);
        }
        if let Some(password) = &credentials.password {
            options = options.password(password);
        }
        if let Some(database) = &credentials.database {
            options = options.database(database);
        }
        Ok(options)
    }

    /// Get a handle to the connection pool.
    ///
    /// Returns an error if not connected.
    async fn get_pool(&self) -> HarvestResult<PgPool> {
        let guard = self.pool.read().await;
        guard
            .as_ref()
            .cloned()
            .ok_or_else(|| HarvestError::query(Dialect::PostgreSQL, "database not connected"))
    }
}

#[async_trait]
impl CatalogConnection for PostgresConnection {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSQL
    }

    async fn connect(&mut self, credentials: &Credentials) -> HarvestResult<()> {
        let options = Self::build_connect_options(credentials)?;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| {
                error!(server = %credentials.display_name(), error = %e, "failed to connect to PostgreSQL");
                HarvestError::connection(Dialect::PostgreSQL, e)
            })?;

        let mut guard = self.pool.write().await;
        *guard = Some(pool);
        info!(server = %credentials.display_name(), "connected to PostgreSQL");

        Ok(())
    }

    async fn execute_query(&self, query: &str, params: &[&str]) -> HarvestResult<Vec<RawRow>> {
        let pool = self.get_pool().await?;

        // The pooled connection goes back to the pool when it drops, whether
        // the fetch succeeded or not.
        let mut conn = pool
            .acquire()
            .await
            .map_err(|e| HarvestError::query(Dialect::PostgreSQL, e))?;

        let mut statement = sqlx::query(query);
        for param in params {
            statement = statement.bind(*param);
        }

        let pg_rows = statement.fetch_all(&mut *conn).await.map_err(|e| {
            error!(error = %e, "PostgreSQL query failed");
            HarvestError::query(Dialect::PostgreSQL, e)
        })?;

        let rows: Vec<RawRow> = pg_rows.iter().map(PgValueConverter::convert_row).collect();
        debug!(rows = rows.len(), ?params, "PostgreSQL query returned");
        Ok(rows)
    }

    async fn close(&mut self) -> HarvestResult<()> {
        let mut guard = self.pool.write().await;
        if let Some(pool) = guard.take() {
            pool.close().await;
            info!("PostgreSQL connection closed");
        }
        Ok(())
    }
}
