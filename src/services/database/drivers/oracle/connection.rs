//! Oracle connection implementation.
//!
//! The `oracle` crate is blocking, so every call into it runs on smol's
//! blocking thread pool.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use oracle::sql_type::{OracleType, ToSql};
use tracing::{debug, error, info};

use super::types::OracleValueConverter;
use crate::error::{HarvestError, HarvestResult};
use crate::services::database::traits::{
    BoxedConnection, CatalogConnection, Credentials, Dialect, RawRow,
};

type SharedConnection = Arc<Mutex<oracle::Connection>>;

/// Oracle catalog connection.
#[derive(Default)]
pub struct OracleConnection {
    conn: Option<SharedConnection>,
}

impl std::fmt::Debug for OracleConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleConnection")
            .field("connected", &self.conn.is_some())
            .finish()
    }
}

impl OracleConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a boxed connection (for factory use).
    pub fn boxed() -> BoxedConnection {
        Box::new(Self::new())
    }

    /// Easy Connect string `host:port/service`.
    pub(crate) fn connect_string(credentials: &Credentials) -> HarvestResult<String> {
        let host = credentials.host(Dialect::Oracle)?;
        let port = credentials.port(Dialect::Oracle)?;

        Ok(format!(
            "{host}:{port}/{}",
            credentials.service_name.as_deref().unwrap_or("")
        ))
    }

    fn get_conn(&self) -> HarvestResult<SharedConnection> {
        self.conn
            .clone()
            .ok_or_else(|| HarvestError::query(Dialect::Oracle, "database not connected"))
    }

    /// Run a query on the calling thread.
    fn query_blocking(
        conn: &oracle::Connection,
        query: &str,
        params: &[String],
    ) -> Result<Vec<RawRow>, oracle::Error> {
        let bind: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
        let result_set = conn.query(query, &bind)?;

        let columns: Vec<(String, OracleType)> = result_set
            .column_info()
            .iter()
            .map(|info| (info.name().to_string(), info.oracle_type().clone()))
            .collect();

        let mut rows = Vec::new();
        for row in result_set {
            rows.push(OracleValueConverter::convert_row(&row?, &columns));
        }
        // the result set is dropped here, releasing its cursor
        Ok(rows)
    }
}

#[async_trait]
impl CatalogConnection for OracleConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Oracle
    }

    async fn connect(&mut self, credentials: &Credentials) -> HarvestResult<()> {
        let connect_string = Self::connect_string(credentials)?;
        let user = credentials.user.clone().unwrap_or_default();
        let password = credentials.password.clone().unwrap_or_default();

        let conn = smol::unblock(move || {
            oracle::Connection::connect(&user, &password, &connect_string)
        })
        .await
        .map_err(|e| {
            error!(server = %credentials.display_name(), error = %e, "failed to connect to Oracle");
            HarvestError::connection(Dialect::Oracle, e)
        })?;

        self.conn = Some(Arc::new(Mutex::new(conn)));
        info!(server = %credentials.display_name(), "connected to Oracle");
        Ok(())
    }

    async fn execute_query(&self, query: &str, params: &[&str]) -> HarvestResult<Vec<RawRow>> {
        let conn = self.get_conn()?;
        let query = query.to_string();
        let owned: Vec<String> = params.iter().map(|p| p.to_string()).collect();

        let rows = smol::unblock(move || {
            let guard = conn
                .lock()
                .map_err(|_| "connection lock poisoned".to_string())?;
            Self::query_blocking(&guard, &query, &owned).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Oracle query failed");
            HarvestError::query(Dialect::Oracle, e)
        })?;

        debug!(rows = rows.len(), ?params, "Oracle query returned");
        Ok(rows)
    }

    async fn close(&mut self) -> HarvestResult<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        smol::unblock(move || match conn.lock() {
            Ok(guard) => guard.close().map_err(|e| e.to_string()),
            Err(_) => Err("connection lock poisoned".to_string()),
        })
        .await
        .map_err(|e| HarvestError::connection(Dialect::Oracle, e))?;

        info!("Oracle connection closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_string() {
        let creds = Credentials {
            host: Some("db.internal".to_string()),
            port: Some("1522".to_string()),
            service_name: Some("ORCLPDB1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            OracleConnection::connect_string(&creds).unwrap(),
            "db.internal:1522/ORCLPDB1"
        );
    }

    #[test]
    fn test_connect_string_requires_host_and_port() {
        let no_port = Credentials {
            host: Some("db".to_string()),
            service_name: Some("XE".to_string()),
            ..Default::default()
        };
        let err = OracleConnection::connect_string(&no_port).unwrap_err();
        assert!(matches!(err, HarvestError::Connection { dialect: Dialect::Oracle, .. }));

        let no_host = Credentials {
            port: Some("1521".to_string()),
            service_name: Some("XE".to_string()),
            ..Default::default()
        };
        let err = OracleConnection::connect_string(&no_host).unwrap_err();
        assert!(err.to_string().contains("ORACLE_HOST is not set"));
    }

    #[test]
    fn test_query_before_connect_fails() {
        let conn = OracleConnection::new();
        let result = smol::block_on(conn.execute_query("SELECT 1 FROM dual", &[]));
        assert!(matches!(result, Err(HarvestError::Query { dialect: Dialect::Oracle, .. })));
    }

    #[test]
    fn test_close_without_connect_is_noop() {
        let mut conn = OracleConnection::new();
        assert!(smol::block_on(conn.close()).is_ok());
    }
}
