//! Per-level catalog records.
//!
//! Each catalog query level has a record type listing the fields every
//! dialect must return for it. Decoding a `RawRow` into a record checks that
//! the fields are present; their values stay raw so the transformer can
//! normalize them (and reject a single bad row without failing the walk).

use serde::{Deserialize, Serialize};

use super::row::{RawRow, Value};

/// Depth in the catalog hierarchy a query operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataLevel {
    Schema,
    Table,
    Column,
    Constraint,
}

impl MetadataLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Table => "table",
            Self::Column => "column",
            Self::Constraint => "constraint",
        }
    }

    /// Lower-case field names every dialect query at this level must return
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::Schema => SchemaRow::FIELDS,
            Self::Table => TableRow::FIELDS,
            Self::Column => ColumnRow::FIELDS,
            Self::Constraint => ConstraintRow::FIELDS,
        }
    }

    /// Number of positional parameters the level's query takes
    pub fn param_count(&self) -> usize {
        match self {
            Self::Schema => 0,
            Self::Table => 1,
            Self::Column | Self::Constraint => 2,
        }
    }

    pub fn all() -> [MetadataLevel; 4] {
        [Self::Schema, Self::Table, Self::Column, Self::Constraint]
    }
}

impl std::fmt::Display for MetadataLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed view over one `RawRow` returned at a given level.
pub trait CatalogRecord: Sized {
    const LEVEL: MetadataLevel;
    const FIELDS: &'static [&'static str];

    /// Decode a raw row, returning the name of the first missing field on
    /// failure.
    fn from_raw(row: RawRow) -> Result<Self, &'static str>;
}

fn take(row: &RawRow, field: &'static str) -> Result<Value, &'static str> {
    row.get(field).cloned().ok_or(field)
}

/// A schema (or Oracle user) record
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRow {
    pub schema_name: Value,
    pub description: Value,
}

impl CatalogRecord for SchemaRow {
    const LEVEL: MetadataLevel = MetadataLevel::Schema;
    const FIELDS: &'static [&'static str] = &["schema_name", "description"];

    fn from_raw(row: RawRow) -> Result<Self, &'static str> {
        Ok(Self {
            schema_name: take(&row, "schema_name")?,
            description: take(&row, "description")?,
        })
    }
}

/// A table record, scoped to one schema
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub table_name: Value,
    pub description: Value,
}

impl CatalogRecord for TableRow {
    const LEVEL: MetadataLevel = MetadataLevel::Table;
    const FIELDS: &'static [&'static str] = &["table_name", "description"];

    fn from_raw(row: RawRow) -> Result<Self, &'static str> {
        Ok(Self {
            table_name: take(&row, "table_name")?,
            description: take(&row, "description")?,
        })
    }
}

/// A column record, scoped to one table
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRow {
    pub column_name: Value,
    pub data_type: Value,
    /// Dialect nullability marker; only the text `YES` means nullable
    pub is_nullable: Value,
    pub ordinal_position: Value,
    pub description: Value,
}

impl CatalogRecord for ColumnRow {
    const LEVEL: MetadataLevel = MetadataLevel::Column;
    const FIELDS: &'static [&'static str] = &[
        "column_name",
        "data_type",
        "is_nullable",
        "ordinal_position",
        "description",
    ];

    fn from_raw(row: RawRow) -> Result<Self, &'static str> {
        Ok(Self {
            column_name: take(&row, "column_name")?,
            data_type: take(&row, "data_type")?,
            is_nullable: take(&row, "is_nullable")?,
            ordinal_position: take(&row, "ordinal_position")?,
            description: take(&row, "description")?,
        })
    }
}

/// A constraint record joined with one of its columns.
///
/// `column_name` is NULL for constraints without key columns (CHECK
/// constraints on PostgreSQL, for instance).
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintRow {
    pub constraint_name: Value,
    pub constraint_type: Value,
    pub column_name: Value,
}

impl ConstraintRow {
    /// Whether this constraint covers the column named `column`.
    ///
    /// Names are compared by text, so a binary-string name from one query
    /// matches the same name returned as text by another.
    pub fn applies_to(&self, column: &Value) -> bool {
        if self.column_name.is_null() || column.is_null() {
            return false;
        }
        match (self.column_name.to_text(), column.to_text()) {
            (Some(own), Some(other)) => own == other,
            _ => false,
        }
    }
}

impl CatalogRecord for ConstraintRow {
    const LEVEL: MetadataLevel = MetadataLevel::Constraint;
    const FIELDS: &'static [&'static str] = &["constraint_name", "constraint_type", "column_name"];

    fn from_raw(row: RawRow) -> Result<Self, &'static str> {
        Ok(Self {
            constraint_name: take(&row, "constraint_name")?,
            constraint_type: take(&row, "constraint_type")?,
            column_name: take(&row, "column_name")?,
        })
    }
}

/// Summary of a table constraint attached to a TABLE entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintInfo {
    pub constraint_name: String,
    pub constraint_type: String,
}

impl From<&ConstraintRow> for ConstraintInfo {
    fn from(row: &ConstraintRow) -> Self {
        Self {
            constraint_name: row.constraint_name.to_text().unwrap_or_default(),
            constraint_type: row.constraint_type.to_text().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_row_from_raw() {
        let raw = RawRow::new()
            .with("SCHEMA_NAME", "public")
            .with("DESCRIPTION", Value::Null);

        let row = SchemaRow::from_raw(raw).unwrap();
        assert_eq!(row.schema_name, Value::from("public"));
        assert!(row.description.is_null());
    }

    #[test]
    fn test_missing_field_is_reported() {
        let raw = RawRow::new()
            .with("column_name", "id")
            .with("data_type", "integer")
            .with("is_nullable", "NO")
            .with("description", "");

        assert_eq!(ColumnRow::from_raw(raw), Err("ordinal_position"));
    }

    #[test]
    fn test_constraint_applies_to() {
        let pk = ConstraintRow {
            constraint_name: Value::from("users_pkey"),
            constraint_type: Value::from("PRIMARY KEY"),
            column_name: Value::from("id"),
        };
        let check = ConstraintRow {
            constraint_name: Value::from("users_check"),
            constraint_type: Value::from("CHECK"),
            column_name: Value::Null,
        };

        assert!(pk.applies_to(&Value::from("id")));
        assert!(!pk.applies_to(&Value::from("name")));
        assert!(!check.applies_to(&Value::Null));
    }

    #[test]
    fn test_constraint_matches_across_text_and_bytes() {
        let pk = ConstraintRow {
            constraint_name: Value::from("PRIMARY"),
            constraint_type: Value::from("PRIMARY KEY"),
            column_name: Value::Bytes(b"id".to_vec()),
        };

        assert!(pk.applies_to(&Value::from("id")));
        assert!(pk.applies_to(&Value::Bytes(b"id".to_vec())));
        assert!(!pk.applies_to(&Value::from("ID")));
        assert!(!pk.applies_to(&Value::from("")));
    }

    #[test]
    fn test_constraint_info_from_row() {
        let row = ConstraintRow {
            constraint_name: Value::from("users_pkey"),
            constraint_type: Value::from("PRIMARY KEY"),
            column_name: Value::from("id"),
        };
        let info = ConstraintInfo::from(&row);
        assert_eq!(info.constraint_name, "users_pkey");
        assert_eq!(info.constraint_type, "PRIMARY KEY");

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["constraintName"], "users_pkey");
        assert_eq!(json["constraintType"], "PRIMARY KEY");
    }

    #[test]
    fn test_level_fields() {
        assert_eq!(MetadataLevel::Schema.fields(), &["schema_name", "description"]);
        assert_eq!(MetadataLevel::Constraint.param_count(), 2);
        assert_eq!(MetadataLevel::Table.to_string(), "table");
    }
}
