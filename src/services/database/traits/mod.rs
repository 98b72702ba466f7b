//! Catalog abstraction traits and types.
//!
//! This module provides a unified interface over every supported dialect.
//! It defines:
//!
//! - **Types** (`types`): Dialect enum and connection credentials
//! - **Row/Value** (`row`): Dialect-neutral value and raw row representation
//! - **Connection** (`connection`): The connect/execute/close contract
//! - **Schema** (`schema`): Per-level catalog records
//!
//! # Example
//!
//! ```ignore
//! use catalog_harvester::services::database::traits::{Credentials, Dialect};
//!
//! let creds = Credentials::from_lookup(Dialect::PostgreSQL, |key| std::env::var(key).ok());
//! ```

pub mod connection;
pub mod row;
pub mod schema;
pub mod types;

pub use connection::{BoxedConnection, CatalogConnection};

pub use row::{RawRow, Value};

pub use schema::{
    CatalogRecord, ColumnRow, ConstraintInfo, ConstraintRow, MetadataLevel, SchemaRow, TableRow,
};

pub use types::{Credentials, Dialect};
