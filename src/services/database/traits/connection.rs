//! Core catalog connection trait.
//!
//! This module defines the `CatalogConnection` trait that every dialect
//! driver implements. The assembler only ever talks to this trait, so the
//! walk is identical for PostgreSQL, MySQL and Oracle.

use async_trait::async_trait;

use super::row::RawRow;
use super::types::{Credentials, Dialect};
use crate::error::HarvestResult;

/// Uniform connect/execute/close contract over every supported dialect.
///
/// # Example
///
/// ```ignore
/// use catalog_harvester::services::database::traits::CatalogConnection;
///
/// async fn count_schemas(conn: &mut dyn CatalogConnection, creds: &Credentials) -> HarvestResult<usize> {
///     conn.connect(creds).await?;
///     let rows = conn.execute_query("SELECT 1 AS one", &[]).await;
///     conn.close().await?;
///     Ok(rows?.len())
/// }
/// ```
#[async_trait]
pub trait CatalogConnection: Send + Sync {
    /// Dialect of this connection
    fn dialect(&self) -> Dialect;

    /// Establish a connection (or pool) using the given credentials.
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::Connection` for invalid credentials, an
    /// unreachable host, or a driver-level rejection.
    async fn connect(&mut self, credentials: &Credentials) -> HarvestResult<()>;

    /// Execute a parameterized query.
    ///
    /// Parameters are bound positionally using the dialect's native
    /// placeholder syntax. Every returned row has lower-cased keys. The
    /// underlying connection or cursor is released before returning, on
    /// success and on failure alike.
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::Query` for malformed SQL, permission denial,
    /// connection loss, or when called before `connect`.
    async fn execute_query(&self, query: &str, params: &[&str]) -> HarvestResult<Vec<RawRow>>;

    /// Release the connection. Idempotent, and a no-op when `connect` never
    /// succeeded.
    async fn close(&mut self) -> HarvestResult<()>;
}

/// A boxed catalog connection trait object.
pub type BoxedConnection = Box<dyn CatalogConnection>;

#[async_trait]
impl CatalogConnection for BoxedConnection {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    async fn connect(&mut self, credentials: &Credentials) -> HarvestResult<()> {
        (**self).connect(credentials).await
    }

    async fn execute_query(&self, query: &str, params: &[&str]) -> HarvestResult<Vec<RawRow>> {
        (**self).execute_query(query, params).await
    }

    async fn close(&mut self) -> HarvestResult<()> {
        (**self).close().await
    }
}
