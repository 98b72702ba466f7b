//! Generic entity transformation.
//!
//! Turns dialect-neutral field maps into SCHEMA, TABLE and COLUMN entities
//! and defines the nested tree an extraction returns.

pub mod entity;
pub mod transformer;

pub use entity::{
    Attributes, CustomAttributes, Entity, EntityKind, EntityStatus, Harvest, SchemaNode,
    SkipTally, TableNode,
};
pub use transformer::{GenericTransformer, fields};
