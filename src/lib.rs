//! Structural metadata harvesting.
//!
//! Extracts schemas, tables, columns and constraints from PostgreSQL, MySQL
//! and Oracle catalogs, or from spreadsheet workbooks, and normalizes them
//! into one nested tree of SCHEMA / TABLE / COLUMN entities.
//!
//! ```ignore
//! use catalog_harvester::services::database::{ConnectionFactory, extract_database};
//! use catalog_harvester::services::database::traits::Dialect;
//!
//! let connector = ConnectionFactory::create(Dialect::PostgreSQL)?;
//! let credentials = catalog_harvester::config::credentials_from_env(Dialect::PostgreSQL);
//! let harvest = extract_database(connector, &credentials, "default/postgresql", Dialect::PostgreSQL).await?;
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod services;

pub use error::{HarvestError, HarvestResult};
