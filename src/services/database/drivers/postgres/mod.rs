//! PostgreSQL catalog driver.
//!
//! Implements `CatalogConnection` over a SQLx `PgPool`. Catalog queries bind
//! their parameters as `$1`, `$2`.
//!
//! # Example
//!
//! ```ignore
//! use catalog_harvester::services::database::drivers::postgres::PostgresConnection;
//! use catalog_harvester::services::database::traits::{CatalogConnection, Credentials, Dialect};
//!
//! let creds = Credentials::from_lookup(Dialect::PostgreSQL, |key| std::env::var(key).ok());
//! let mut conn = PostgresConnection::new();
//! conn.connect(&creds).await?;
//! ```

mod connection;
mod types;

pub use connection::PostgresConnection;
pub use types::PgValueConverter;
