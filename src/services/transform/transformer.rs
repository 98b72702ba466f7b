//! Raw field map → typed entity.
//!
//! The transformer never fails outright: a row it cannot turn into an entity
//! is logged and comes back as `None`, so one bad row never costs the rest of
//! the walk.

use tracing::error;

use super::entity::{Attributes, CustomAttributes, Entity, EntityKind, EntityStatus, SkipTally};
use crate::error::{HarvestError, HarvestResult};
use crate::services::database::traits::{RawRow, Value};

/// Field names the transformer reads from its input map.
pub mod fields {
    pub const SCHEMA_NAME: &str = "schema_name";
    pub const TABLE_NAME: &str = "table_name";
    pub const COLUMN_NAME: &str = "column_name";
    pub const DATABASE_NAME: &str = "database_name";
    pub const CONNECTION_QUALIFIED_NAME: &str = "connection_qualified_name";
    pub const DESCRIPTION: &str = "description";
    pub const TAGS: &str = "tags";
    pub const DATA_TYPE: &str = "data_type";
    pub const IS_NULLABLE: &str = "is_nullable";
    pub const ORDINAL_POSITION: &str = "ordinal_position";
    pub const CONSTRAINT_TYPE: &str = "constraint_type";
}

/// The only nullability marker that means nullable
pub const NULLABLE_MARKER: &str = "YES";

/// Maps raw field maps into SCHEMA, TABLE and COLUMN entities.
#[derive(Debug, Clone)]
pub struct GenericTransformer {
    connector_name: String,
}

impl GenericTransformer {
    pub fn new(connector_name: impl Into<String>) -> Self {
        Self {
            connector_name: connector_name.into(),
        }
    }

    /// Build an entity from a type name matched case-insensitively.
    ///
    /// Unknown type names are logged and yield `None`.
    pub fn transform_row(&self, type_name: &str, row: &RawRow) -> Option<Entity> {
        match type_name.parse::<EntityKind>() {
            Ok(kind) => self.transform(kind, row),
            Err(e) => {
                error!(connector = %self.connector_name, type_name, "{e}");
                None
            }
        }
    }

    /// Build an entity of `kind`, or log the failure and return `None`.
    pub fn transform(&self, kind: EntityKind, row: &RawRow) -> Option<Entity> {
        match Self::build(kind, row) {
            Ok(entity) => Some(entity),
            Err(e) => {
                error!(connector = %self.connector_name, kind = %kind, error = %e, "failed to transform row");
                None
            }
        }
    }

    /// `transform`, counting a rejected row in `skipped`.
    pub fn transform_counted(
        &self,
        kind: EntityKind,
        row: &RawRow,
        skipped: &mut SkipTally,
    ) -> Option<Entity> {
        let entity = self.transform(kind, row);
        if entity.is_none() {
            skipped.record(kind);
        }
        entity
    }

    fn build(kind: EntityKind, row: &RawRow) -> HarvestResult<Entity> {
        let text = |field: &'static str| text_field(kind, row, field);

        let connection_qualified_name = text(fields::CONNECTION_QUALIFIED_NAME)?;
        let schema = text(fields::SCHEMA_NAME)?;

        let (name, qualified_name) = match kind {
            EntityKind::Schema => {
                let qualified = qualified_name(&connection_qualified_name, &[schema.as_str()]);
                (schema.clone(), qualified)
            }
            EntityKind::Table => {
                let table = text(fields::TABLE_NAME)?;
                let qualified = qualified_name(
                    &connection_qualified_name,
                    &[schema.as_str(), table.as_str()],
                );
                (table, qualified)
            }
            EntityKind::Column => {
                let table = text(fields::TABLE_NAME)?;
                let column = text(fields::COLUMN_NAME)?;
                let qualified = qualified_name(
                    &connection_qualified_name,
                    &[schema.as_str(), table.as_str(), column.as_str()],
                );
                (column, qualified)
            }
        };

        let mut attributes = Attributes {
            name,
            qualified_name,
            connection_qualified_name,
            database_name: text(fields::DATABASE_NAME)?,
            schema_name: None,
            table_name: None,
            data_type: None,
            is_nullable: None,
            order: None,
        };
        let mut custom_attributes = CustomAttributes {
            description: text(fields::DESCRIPTION)?,
            tags: tags_field(kind, row)?,
            constraint_type: None,
        };

        if kind != EntityKind::Schema {
            attributes.schema_name = Some(schema);
        }
        if kind == EntityKind::Column {
            attributes.table_name = Some(text(fields::TABLE_NAME)?);
            attributes.data_type = Some(text(fields::DATA_TYPE)?);
            attributes.is_nullable = Some(is_nullable(row.get(fields::IS_NULLABLE)));
            attributes.order = Some(order_field(kind, row)?);
            custom_attributes.constraint_type = Some(text(fields::CONSTRAINT_TYPE)?);
        }

        Ok(Entity {
            type_name: kind,
            attributes,
            custom_attributes,
            status: EntityStatus::Active,
        })
    }
}

/// `<connection>/<a>/<b>...`
pub fn qualified_name(connection_qualified_name: &str, path: &[&str]) -> String {
    let mut name = connection_qualified_name.to_string();
    for part in path {
        name.push('/');
        name.push_str(part);
    }
    name
}

/// Only the exact text `YES` marks a column nullable. UTF-8 byte strings
/// are compared by their text.
pub fn is_nullable(marker: Option<&Value>) -> bool {
    match marker {
        Some(value @ (Value::Text(_) | Value::Bytes(_))) => {
            value.to_text().as_deref() == Some(NULLABLE_MARKER)
        }
        _ => false,
    }
}

fn text_field(kind: EntityKind, row: &RawRow, field: &str) -> HarvestResult<String> {
    match row.get(field) {
        None => Ok(String::new()),
        Some(value) => value.to_text().ok_or_else(|| {
            HarvestError::transform(
                kind.as_str(),
                format!("{field} is not text (got {})", value.type_name()),
            )
        }),
    }
}

fn order_field(kind: EntityKind, row: &RawRow) -> HarvestResult<i64> {
    match row.get(fields::ORDINAL_POSITION) {
        None | Some(Value::Null) => Ok(1),
        Some(value) => value.to_i64().ok_or_else(|| {
            HarvestError::transform(
                kind.as_str(),
                format!("ordinal_position {value} is not an integer"),
            )
        }),
    }
}

fn tags_field(kind: EntityKind, row: &RawRow) -> HarvestResult<Vec<String>> {
    let invalid = |what: &str| {
        HarvestError::transform(kind.as_str(), format!("tags must be a list of text, got {what}"))
    };

    match row.get(fields::TAGS) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(|| invalid(item.type_name())))
            .collect(),
        Some(other) => Err(invalid(other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_row() -> RawRow {
        RawRow::new()
            .with(fields::CONNECTION_QUALIFIED_NAME, "conn/db")
            .with(fields::DATABASE_NAME, "db")
            .with(fields::SCHEMA_NAME, "public")
            .with(fields::TABLE_NAME, "users")
            .with(fields::COLUMN_NAME, "id")
            .with(fields::DATA_TYPE, "integer")
            .with(fields::IS_NULLABLE, "NO")
            .with(fields::ORDINAL_POSITION, 1i64)
            .with(fields::DESCRIPTION, Value::Null)
            .with(fields::CONSTRAINT_TYPE, "PRIMARY KEY")
    }

    #[test]
    fn test_column_qualified_name() {
        let transformer = GenericTransformer::new("postgresql");
        let entity = transformer.transform(EntityKind::Column, &column_row()).unwrap();

        assert_eq!(entity.qualified_name(), "conn/db/public/users/id");
        assert_eq!(entity.attributes.schema_name.as_deref(), Some("public"));
        assert_eq!(entity.attributes.table_name.as_deref(), Some("users"));
        assert_eq!(entity.attributes.data_type.as_deref(), Some("integer"));
        assert_eq!(entity.attributes.is_nullable, Some(false));
        assert_eq!(entity.attributes.order, Some(1));
        assert_eq!(entity.custom_attributes.description, "");
        assert_eq!(entity.custom_attributes.constraint_type.as_deref(), Some("PRIMARY KEY"));
        assert_eq!(entity.status, EntityStatus::Active);
    }

    #[test]
    fn test_schema_and_table_names() {
        let transformer = GenericTransformer::new("mysql");
        let row = RawRow::new()
            .with(fields::CONNECTION_QUALIFIED_NAME, "default/mysql")
            .with(fields::SCHEMA_NAME, "shop")
            .with(fields::TABLE_NAME, "orders")
            .with(fields::DESCRIPTION, "customer orders");

        let schema = transformer.transform(EntityKind::Schema, &row).unwrap();
        assert_eq!(schema.qualified_name(), "default/mysql/shop");
        assert_eq!(schema.attributes.schema_name, None);

        let table = transformer.transform(EntityKind::Table, &row).unwrap();
        assert_eq!(table.name(), "orders");
        assert_eq!(table.qualified_name(), "default/mysql/shop/orders");
        assert_eq!(table.attributes.schema_name.as_deref(), Some("shop"));
        assert_eq!(table.attributes.database_name, "");
        assert_eq!(table.custom_attributes.description, "customer orders");
        assert_eq!(table.custom_attributes.constraint_type, None);
    }

    #[test]
    fn test_missing_ancestors_become_empty() {
        let row = RawRow::new().with(fields::COLUMN_NAME, "id");
        let entity = GenericTransformer::new("x")
            .transform(EntityKind::Column, &row)
            .unwrap();

        assert_eq!(entity.qualified_name(), "///id");
        assert_eq!(entity.attributes.order, Some(1));
    }

    #[test]
    fn test_only_yes_marks_nullable() {
        assert!(is_nullable(Some(&Value::from("YES"))));
        assert!(!is_nullable(Some(&Value::from("NO"))));
        assert!(!is_nullable(Some(&Value::from(""))));
        assert!(!is_nullable(Some(&Value::from("yes"))));
        assert!(!is_nullable(Some(&Value::Null)));
        assert!(!is_nullable(Some(&Value::Bool(true))));
        assert!(!is_nullable(None));
    }

    #[test]
    fn test_binary_nullable_marker() {
        assert!(is_nullable(Some(&Value::Bytes(b"YES".to_vec()))));
        assert!(!is_nullable(Some(&Value::Bytes(b"yes".to_vec()))));
        assert!(!is_nullable(Some(&Value::Bytes(b"NO".to_vec()))));

        let row = column_row()
            .with(fields::COLUMN_NAME, Value::Bytes(b"note".to_vec()))
            .with(fields::IS_NULLABLE, Value::Bytes(b"YES".to_vec()));
        let entity = GenericTransformer::new("mysql")
            .transform(EntityKind::Column, &row)
            .unwrap();
        assert_eq!(entity.qualified_name(), "conn/db/public/users/note");
        assert_eq!(entity.attributes.is_nullable, Some(true));
    }

    #[test]
    fn test_type_name_is_case_insensitive() {
        let transformer = GenericTransformer::new("postgresql");
        let lower = transformer.transform_row("table", &column_row()).unwrap();
        let upper = transformer.transform_row("TABLE", &column_row()).unwrap();

        assert_eq!(lower, upper);
        assert_eq!(lower.type_name, EntityKind::Table);
    }

    #[test]
    fn test_unknown_type_name_yields_none() {
        let transformer = GenericTransformer::new("postgresql");
        assert!(transformer.transform_row("VIEW", &column_row()).is_none());
    }

    #[test]
    fn test_bad_values_yield_none() {
        let transformer = GenericTransformer::new("postgresql");

        let bad_name = column_row().with(fields::COLUMN_NAME, Value::Bytes(vec![0xff, 0xfe]));
        assert!(transformer.transform(EntityKind::Column, &bad_name).is_none());

        let bad_order = column_row().with(fields::ORDINAL_POSITION, "first");
        assert!(transformer.transform(EntityKind::Column, &bad_order).is_none());

        let bad_tags = column_row().with(fields::TAGS, "pii");
        assert!(transformer.transform(EntityKind::Column, &bad_tags).is_none());
    }

    #[test]
    fn test_rejected_rows_are_counted() {
        let transformer = GenericTransformer::new("postgresql");
        let mut skipped = SkipTally::default();

        let bad = column_row().with(fields::ORDINAL_POSITION, "first");
        assert!(transformer.transform_counted(EntityKind::Column, &bad, &mut skipped).is_none());
        assert!(
            transformer
                .transform_counted(EntityKind::Table, &column_row(), &mut skipped)
                .is_some()
        );

        assert_eq!(skipped.columns, 1);
        assert_eq!(skipped.tables, 0);
        assert_eq!(skipped.total(), 1);
    }

    #[test]
    fn test_coercions() {
        let transformer = GenericTransformer::new("mysql");
        let row = column_row()
            .with(fields::COLUMN_NAME, Value::Bytes(b"email".to_vec()))
            .with(fields::ORDINAL_POSITION, "3")
            .with(
                fields::TAGS,
                Value::Array(vec![Value::from("pii"), Value::from("gdpr")]),
            );

        let entity = transformer.transform(EntityKind::Column, &row).unwrap();
        assert_eq!(entity.name(), "email");
        assert_eq!(entity.attributes.order, Some(3));
        assert_eq!(entity.custom_attributes.tags, vec!["pii", "gdpr"]);
    }
}
