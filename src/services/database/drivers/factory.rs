//! Connection factory for creating catalog connections.
//!
//! The factory pattern allows creating the appropriate connector for a
//! dialect chosen at runtime (from the CLI, for instance).

use super::mysql::MySqlConnection;
#[cfg(feature = "oracle")]
use super::oracle::OracleConnection;
use super::postgres::PostgresConnection;
use crate::error::HarvestResult;
use crate::services::database::traits::{BoxedConnection, Dialect};

/// Factory for creating catalog connections by dialect.
///
/// # Example
///
/// ```ignore
/// use catalog_harvester::services::database::drivers::ConnectionFactory;
/// use catalog_harvester::services::database::traits::Dialect;
///
/// let connection = ConnectionFactory::create(Dialect::MySQL)?;
/// ```
pub struct ConnectionFactory;

impl ConnectionFactory {
    /// Create a new, unconnected connector for `dialect`.
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::Connection` if the dialect's driver was not
    /// compiled in.
    pub fn create(dialect: Dialect) -> HarvestResult<BoxedConnection> {
        match dialect {
            Dialect::PostgreSQL => Ok(PostgresConnection::boxed()),
            Dialect::MySQL => Ok(MySqlConnection::boxed()),
            #[cfg(feature = "oracle")]
            Dialect::Oracle => Ok(OracleConnection::boxed()),
            #[cfg(not(feature = "oracle"))]
            Dialect::Oracle => Err(crate::error::HarvestError::connection(
                Dialect::Oracle,
                "built without the `oracle` feature",
            )),
        }
    }

    /// Check if a dialect has a driver in this build.
    pub fn is_supported(dialect: Dialect) -> bool {
        match dialect {
            Dialect::PostgreSQL | Dialect::MySQL => true,
            Dialect::Oracle => cfg!(feature = "oracle"),
        }
    }

    /// Get a list of all dialects with a driver in this build.
    pub fn supported_types() -> Vec<Dialect> {
        Dialect::all()
            .into_iter()
            .filter(|d| Self::is_supported(*d))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::database::traits::CatalogConnection;

    #[test]
    fn test_factory_creates_matching_dialect() {
        for dialect in ConnectionFactory::supported_types() {
            let conn = ConnectionFactory::create(dialect).unwrap();
            assert_eq!(conn.dialect(), dialect);
        }
    }

    #[test]
    fn test_sqlx_dialects_always_supported() {
        assert!(ConnectionFactory::is_supported(Dialect::PostgreSQL));
        assert!(ConnectionFactory::is_supported(Dialect::MySQL));
        assert_eq!(
            ConnectionFactory::is_supported(Dialect::Oracle),
            cfg!(feature = "oracle")
        );
    }

    #[cfg(not(feature = "oracle"))]
    #[test]
    fn test_oracle_without_feature() {
        let err = ConnectionFactory::create(Dialect::Oracle).err().unwrap();
        assert!(err.to_string().contains("oracle"));
    }
}
