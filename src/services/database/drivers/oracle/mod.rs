//! Oracle catalog driver.
//!
//! Implements `CatalogConnection` with the `oracle` crate (ODPI-C). Catalog
//! queries bind their parameters as `:1`, `:2`. Compiled only with the
//! `oracle` feature.

mod connection;
mod types;

pub use connection::OracleConnection;
pub use types::OracleValueConverter;
