//! MySQL connection implementation.
//!
//! This module implements the `CatalogConnection` trait for MySQL
//! using SQLx's MySqlPool.

use std::time::Duration;

use async_lock::RwLock;
use async_trait::async_trait;
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use tracing::{debug, error, info};

use super::types::MySqlValueConverter;
use crate::error::{HarvestError, HarvestResult};
use crate::services::database::traits::{
    BoxedConnection, CatalogConnection, Credentials, Dialect, RawRow,
};

/// MySQL catalog connection.
///
/// This struct wraps a SQLx MySqlPool and implements the `CatalogConnection` trait.
pub struct MySqlConnection {
    pool: RwLock<Option<MySqlPool>>,
}

impl std::fmt::Debug for MySqlConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlConnection")
            .field("pool", &"<MySqlPool>")
            .finish()
    }
}

impl Default for MySqlConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl MySqlConnection {
    /// Create a new MySQL connection.
    ///
    /// This does not connect immediately - call `connect()` to establish the connection.
    pub fn new() -> Self {
        Self {
            pool: RwLock::new(None),
        }
    }

    /// Create a boxed connection (for factory use).
    pub fn boxed() -> BoxedConnection {
        Box::new(Self::new())
    }

    /// Build MySqlConnectOptions from the credentials.
    pub(crate) fn build_connect_options(credentials: &Credentials) -> HarvestResult<MySqlConnectOptions> {
        let host = credentials.host(Dialect::MySQL)?;
        let port = credentials.port(Dialect::MySQL)?;

        let mut options = MySqlConnectOptions::new().host(host).port(port);
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
    async fn get_pool(&self) -> HarvestResult<MySqlPool> {
        let guard = self.pool.read().await;
        guard
            .as_ref()
            .cloned()
            .ok_or_else(|| HarvestError::query(Dialect::MySQL, "database not connected"))
    }
}

#[async_trait]
impl CatalogConnection for MySqlConnection {
    fn dialect(&self) -> Dialect {
        Dialect::MySQL
    }

    async fn connect(&mut self, credentials: &Credentials) -> HarvestResult<()> {
        let options = Self::build_connect_options(credentials)?;

        let pool = MySqlPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await
            .map_err(|e| {
                error!(server = %credentials.display_name(), error = %e, "failed to connect to MySQL");
                HarvestError::connection(Dialect::MySQL, e)
            })?;

        let mut guard = self.pool.write().await;
        *guard = Some(pool);
        info!(server = %credentials.display_name(), "connected to MySQL");

        Ok(())
    }

    async fn execute_query(&self, query: &str, params: &[&str]) -> HarvestResult<Vec<RawRow>> {
        let pool = self.get_pool().await?;

        let mut conn = pool
            .acquire()
            .await
            .map_err(|e| HarvestError::query(Dialect::MySQL, e))?;

        let mut statement = sqlx::query(query);
        for param in params {
            statement = statement.bind(*param);
        }

        let mysql_rows = statement.fetch_all(&mut *conn).await.map_err(|e| {
            error!(error = %e, "MySQL query failed");
            HarvestError::query(Dialect::MySQL, e)
        })?;

        let rows: Vec<RawRow> = mysql_rows
            .iter()
            .map(MySqlValueConverter::convert_row)
            .collect();
        debug!(rows = rows.len(), ?params, "MySQL query returned");
        Ok(rows)
    }

    async fn close(&mut self) -> HarvestResult<()> {
        let mut guard = self.pool.write().await;
        if let Some(pool) = guard.take() {
            pool.close().await;
            info!("MySQL connection closed");
        }
        Ok(())
    }
}
