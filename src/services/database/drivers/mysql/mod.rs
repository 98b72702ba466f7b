//! MySQL catalog driver.
//!
//! Implements `CatalogConnection` over a SQLx `MySqlPool`. Catalog queries
//! bind their parameters as `?`.

mod connection;
mod types;

pub use connection::MySqlConnection;
pub use types::MySqlValueConverter;
