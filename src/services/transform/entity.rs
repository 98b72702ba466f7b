//! Normalized catalog entities and the harvest tree.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::database::traits::ConstraintInfo;

/// Kinds of entity the transformer can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityKind {
    Schema,
    Table,
    Column,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schema => "SCHEMA",
            Self::Table => "TABLE",
            Self::Column => "COLUMN",
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SCHEMA" => Ok(Self::Schema),
            "TABLE" => Ok(Self::Table),
            "COLUMN" => Ok(Self::Column),
            _ => Err(format!("unknown entity type: {s}")),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityStatus {
    #[default]
    Active,
}

/// Identity and structural attributes of an entity.
///
/// `schemaName` is set for tables and columns, `tableName`, `dataType`,
/// `isNullable` and `order` for columns only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attributes {
    pub name: String,
    pub qualified_name: String,
    pub connection_qualified_name: String,
    pub database_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAttributes {
    pub description: String,
    pub tags: Vec<String>,
    /// Type of the first constraint covering a column, "" when none does
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint_type: Option<String>,
}

/// One normalized SCHEMA, TABLE or COLUMN record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub type_name: EntityKind,
    pub attributes: Attributes,
    pub custom_attributes: CustomAttributes,
    pub status: EntityStatus,
}

impl Entity {
    pub fn name(&self) -> &str {
        &self.attributes.name
    }

    pub fn qualified_name(&self) -> &str {
        &self.attributes.qualified_name
    }
}

/// A SCHEMA entity with its tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    #[serde(flatten)]
    pub entity: Entity,
    pub tables: Vec<TableNode>,
}

impl SchemaNode {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            tables: Vec::new(),
        }
    }
}

/// A TABLE entity with its columns and every constraint on the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableNode {
    #[serde(flatten)]
    pub entity: Entity,
    pub columns: Vec<Entity>,
    pub constraints: Vec<ConstraintInfo>,
}

impl TableNode {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }
}

/// Rows the transformer rejected during one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipTally {
    pub schemas: usize,
    pub tables: usize,
    pub columns: usize,
}

impl SkipTally {
    pub fn record(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Schema => self.schemas += 1,
            EntityKind::Table => self.tables += 1,
            EntityKind::Column => self.columns += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.schemas + self.tables + self.columns
    }
}

/// Result of one extraction run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Harvest {
    #[serde(skip)]
    pub run_id: Uuid,
    pub schemas: Vec<SchemaNode>,
    pub skipped: SkipTally,
}

impl Harvest {
    pub fn empty(run_id: Uuid) -> Self {
        Self {
            run_id,
            schemas: Vec::new(),
            skipped: SkipTally::default(),
        }
    }

    pub fn table_count(&self) -> usize {
        self.schemas.iter().map(|s| s.tables.len()).sum()
    }

    pub fn column_count(&self) -> usize {
        self.schemas
            .iter()
            .flat_map(|s| &s.tables)
            .map(|t| t.columns.len())
            .sum()
    }
}
