//! Catalog driver implementations.
//!
//! - **PostgreSQL**: SQLx `PgPool`
//! - **MySQL**: SQLx `MySqlPool`
//! - **Oracle**: the `oracle` crate, behind the `oracle` feature
//!
//! Each driver implements the `CatalogConnection` trait.

mod factory;

pub mod mysql;
#[cfg(feature = "oracle")]
pub mod oracle;
pub mod postgres;

pub use factory::ConnectionFactory;
