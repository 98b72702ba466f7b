//! Relational catalog harvesting.
//!
//! - `traits`: the connector contract and dialect-neutral row types
//! - `drivers`: PostgreSQL, MySQL and Oracle connectors
//! - `queries`: the per-dialect catalog query set
//! - `assembler`: the schema → table → column walk

pub mod assembler;
pub mod drivers;
pub mod queries;
pub mod traits;

pub use assembler::extract_database;
pub use drivers::ConnectionFactory;
