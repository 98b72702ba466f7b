//! Metadata tree assembler.
//!
//! Walks schema → tables → columns/constraints over any `CatalogConnection`
//! and builds the nested entity tree. The walk is sequential and the
//! connector is always closed, whether the walk succeeded or not.

use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use super::queries::query_for;
use super::traits::{
    CatalogConnection, CatalogRecord, ColumnRow, ConstraintInfo, ConstraintRow, Credentials,
    Dialect, RawRow, SchemaRow, TableRow, Value,
};
use crate::error::{HarvestError, HarvestResult};
use crate::services::transform::{
    Entity, EntityKind, GenericTransformer, Harvest, SchemaNode, SkipTally, TableNode, fields,
};

/// Extract the full schema tree reachable through `connector`.
///
/// The connector is consumed: it is connected, walked, and closed here.
///
/// # Errors
///
/// Connection and query failures abort the extraction; no partial tree is
/// returned. Rows the transformer rejects are skipped and counted in
/// `Harvest::skipped`.
pub async fn extract_database<C: CatalogConnection>(
    mut connector: C,
    credentials: &Credentials,
    connection_qualified_name: &str,
    dialect: Dialect,
) -> HarvestResult<Harvest> {
    let run_id = Uuid::new_v4();
    let span = info_span!("harvest", dialect = %dialect, run_id = %run_id);

    async move {
        let outcome = match connector.connect(credentials).await {
            Ok(()) => {
                let walker = TreeWalker {
                    connector: &connector,
                    dialect,
                    transformer: GenericTransformer::new(dialect.to_db_str()),
                    connection_qualified_name,
                    database_name: credentials.database_name(),
                    skipped: SkipTally::default(),
                };
                walker.walk(run_id).await
            }
            Err(e) => Err(e),
        };

        let closed = connector.close().await;

        match outcome {
            Ok(harvest) => {
                if let Err(e) = closed {
                    warn!(error = %e, "failed to close connector");
                }
                info!(
                    schemas = harvest.schemas.len(),
                    tables = harvest.table_count(),
                    columns = harvest.column_count(),
                    skipped_schemas = harvest.skipped.schemas,
                    skipped_tables = harvest.skipped.tables,
                    skipped_columns = harvest.skipped.columns,
                    "extraction finished"
                );
                Ok(harvest)
            }
            Err(e) => {
                if let Err(close_err) = closed {
                    warn!(error = %close_err, "failed to close connector");
                }
                error!(error = %e, "extraction failed");
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}

struct TreeWalker<'a, C: CatalogConnection> {
    connector: &'a C,
    dialect: Dialect,
    transformer: GenericTransformer,
    connection_qualified_name: &'a str,
    database_name: &'a str,
    skipped: SkipTally,
}

impl<C: CatalogConnection> TreeWalker<'_, C> {
    async fn walk(mut self, run_id: Uuid) -> HarvestResult<Harvest> {
        let schema_rows: Vec<SchemaRow> = self.fetch(&[]).await?;
        if schema_rows.is_empty() {
            warn!("no schemas found");
            return Ok(Harvest::empty(run_id));
        }

        let mut schemas = Vec::new();
        for schema_row in schema_rows {
            let fields = self
                .base_fields()
                .with(fields::SCHEMA_NAME, schema_row.schema_name)
                .with(fields::DESCRIPTION, schema_row.description);

            let Some(entity) = self.transform(EntityKind::Schema, &fields) else {
                continue;
            };

            let mut node = SchemaNode::new(entity);
            node.tables = self.walk_schema(node.entity.name()).await?;
            schemas.push(node);
        }

        Ok(Harvest {
            run_id,
            schemas,
            skipped: self.skipped,
        })
    }

    async fn walk_schema(&mut self, schema: &str) -> HarvestResult<Vec<TableNode>> {
        let table_rows: Vec<TableRow> = self.fetch(&[schema]).await?;

        let mut tables = Vec::new();
        for table_row in table_rows {
            let fields = self
                .base_fields()
                .with(fields::SCHEMA_NAME, schema)
                .with(fields::TABLE_NAME, table_row.table_name)
                .with(fields::DESCRIPTION, table_row.description);

            let Some(entity) = self.transform(EntityKind::Table, &fields) else {
                continue;
            };

            let mut node = TableNode::new(entity);
            self.walk_table(schema, &mut node).await?;
            tables.push(node);
        }
        Ok(tables)
    }

    async fn walk_table(&mut self, schema: &str, node: &mut TableNode) -> HarvestResult<()> {
        let table = node.entity.name().to_string();
        let column_rows: Vec<ColumnRow> = self.fetch(&[schema, table.as_str()]).await?;
        let constraint_rows: Vec<ConstraintRow> = self.fetch(&[schema, table.as_str()]).await?;

        for column_row in column_rows {
            let constraint_type = first_constraint_type(&constraint_rows, &column_row.column_name);
            let fields = self
                .base_fields()
                .with(fields::SCHEMA_NAME, schema)
                .with(fields::TABLE_NAME, table.as_str())
                .with(fields::COLUMN_NAME, column_row.column_name)
                .with(fields::DATA_TYPE, column_row.data_type)
                .with(fields::IS_NULLABLE, column_row.is_nullable)
                .with(fields::ORDINAL_POSITION, column_row.ordinal_position)
                .with(fields::DESCRIPTION, column_row.description)
                .with(fields::CONSTRAINT_TYPE, constraint_type);

            if let Some(entity) = self.transform(EntityKind::Column, &fields) {
                node.columns.push(entity);
            }
        }

        node.constraints = constraint_rows.iter().map(ConstraintInfo::from).collect();
        Ok(())
    }

    /// Run the level query for `R` and decode every row.
    async fn fetch<R: CatalogRecord>(&self, params: &[&str]) -> HarvestResult<Vec<R>> {
        let query = query_for(R::LEVEL, self.dialect);
        let rows = self.connector.execute_query(query, params).await?;

        rows.into_iter()
            .map(|row| {
                R::from_raw(row).map_err(|field| {
                    HarvestError::query(
                        self.dialect,
                        format!("{} row is missing field `{field}`", R::LEVEL),
                    )
                })
            })
            .collect()
    }

    fn base_fields(&self) -> RawRow {
        RawRow::new()
            .with(fields::CONNECTION_QUALIFIED_NAME, self.connection_qualified_name)
            .with(fields::DATABASE_NAME, self.database_name)
    }

    fn transform(&mut self, kind: EntityKind, fields: &RawRow) -> Option<Entity> {
        self.transformer.transform_counted(kind, fields, &mut self.skipped)
    }
}

/// Type of the first constraint (in fetch order) covering `column`.
fn first_constraint_type(constraints: &[ConstraintRow], column: &Value) -> Value {
    constraints
        .iter()
        .find(|c| c.applies_to(column))
        .map(|c| c.constraint_type.clone())
        .unwrap_or_else(|| Value::from(""))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::services::database::queries::level_of;
    use crate::services::database::traits::MetadataLevel;

    #[derive(Debug, Default)]
    struct CallLog {
        connected: bool,
        closed: usize,
        queries: Vec<(MetadataLevel, Vec<String>)>,
    }

    /// In-memory connector answering catalog queries from a script.
    #[derive(Default)]
    struct ScriptedConnection {
        dialect: Option<Dialect>,
        responses: HashMap<(MetadataLevel, Vec<String>), Vec<RawRow>>,
        fail_connect: bool,
        fail_on: Option<MetadataLevel>,
        log: Arc<Mutex<CallLog>>,
    }

    impl ScriptedConnection {
        fn new() -> Self {
            Self::default()
        }

        fn respond(mut self, level: MetadataLevel, params: &[&str], rows: Vec<RawRow>) -> Self {
            let params = params.iter().map(|p| p.to_string()).collect();
            self.responses.insert((level, params), rows);
            self
        }

        fn log(&self) -> Arc<Mutex<CallLog>> {
            Arc::clone(&self.log)
        }
    }

    #[async_trait]
    impl CatalogConnection for ScriptedConnection {
        fn dialect(&self) -> Dialect {
            self.dialect.unwrap_or(Dialect::PostgreSQL)
        }

        async fn connect(&mut self, _credentials: &Credentials) -> HarvestResult<()> {
            if self.fail_connect {
                return Err(HarvestError::connection(self.dialect(), "password authentication failed"));
            }
            self.log.lock().unwrap().connected = true;
            Ok(())
        }

        async fn execute_query(&self, query: &str, params: &[&str]) -> HarvestResult<Vec<RawRow>> {
            let level = level_of(query, self.dialect())
                .ok_or_else(|| HarvestError::query(self.dialect(), "unknown query"))?;
            let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
            self.log.lock().unwrap().queries.push((level, params.clone()));

            if self.fail_on == Some(level) {
                return Err(HarvestError::query(self.dialect(), "permission denied"));
            }
            Ok(self.responses.get(&(level, params)).cloned().unwrap_or_default())
        }

        async fn close(&mut self) -> HarvestResult<()> {
            self.log.lock().unwrap().closed += 1;
            Ok(())
        }
    }

    fn schema(name: &str) -> RawRow {
        RawRow::new().with("schema_name", name).with("description", Value::Null)
    }

    fn table(name: impl Into<Value>) -> RawRow {
        RawRow::new().with("table_name", name).with("description", Value::Null)
    }

    fn column(name: &str, data_type: &str, nullable: &str, position: i64) -> RawRow {
        RawRow::new()
            .with("column_name", name)
            .with("data_type", data_type)
            .with("is_nullable", nullable)
            .with("ordinal_position", position)
            .with("description", Value::Null)
    }

    fn constraint(name: &str, kind: &str, column: Option<&str>) -> RawRow {
        RawRow::new()
            .with("constraint_name", name)
            .with("constraint_type", kind)
            .with("column_name", column)
    }

    fn credentials() -> Credentials {
        Credentials {
            database: Some("db".to_string()),
            ..Default::default()
        }
    }

    fn users_table() -> ScriptedConnection {
        ScriptedConnection::new()
            .respond(MetadataLevel::Schema, &[], vec![schema("public")])
            .respond(MetadataLevel::Table, &["public"], vec![table("users")])
            .respond(
                MetadataLevel::Column,
                &["public", "users"],
                vec![
                    column("id", "integer", "NO", 1),
                    column("name", "character varying", "YES", 2),
                ],
            )
            .respond(
                MetadataLevel::Constraint,
                &["public", "users"],
                vec![constraint("users_pkey", "PRIMARY KEY", Some("id"))],
            )
    }

    #[test]
    fn test_end_to_end_tree() {
        let conn = users_table();
        let log = conn.log();

        let harvest = smol::block_on(extract_database(
            conn,
            &credentials(),
            "conn",
            Dialect::PostgreSQL,
        ))
        .unwrap();

        assert_eq!(harvest.schemas.len(), 1);
        let schema = &harvest.schemas[0];
        assert_eq!(schema.entity.qualified_name(), "conn/public");
        assert_eq!(schema.entity.attributes.database_name, "db");

        assert_eq!(schema.tables.len(), 1);
        let table = &schema.tables[0];
        assert_eq!(table.entity.qualified_name(), "conn/public/users");
        assert_eq!(table.entity.custom_attributes.description, "");
        assert_eq!(table.constraints.len(), 1);
        assert_eq!(table.constraints[0].constraint_name, "users_pkey");

        assert_eq!(table.columns.len(), 2);
        let id = &table.columns[0];
        assert_eq!(id.qualified_name(), "conn/public/users/id");
        assert_eq!(id.attributes.is_nullable, Some(false));
        assert_eq!(id.attributes.order, Some(1));
        assert_eq!(id.custom_attributes.constraint_type.as_deref(), Some("PRIMARY KEY"));

        let name = &table.columns[1];
        assert_eq!(name.attributes.is_nullable, Some(true));
        assert_eq!(name.attributes.order, Some(2));
        assert_eq!(name.custom_attributes.constraint_type.as_deref(), Some(""));

        assert_eq!(harvest.skipped, SkipTally::default());
        let log = log.lock().unwrap();
        assert!(log.connected);
        assert_eq!(log.closed, 1);
    }

    #[test]
    fn test_no_schemas_is_empty_result() {
        let conn = ScriptedConnection::new();
        let log = conn.log();

        let harvest = smol::block_on(extract_database(
            conn,
            &credentials(),
            "conn",
            Dialect::PostgreSQL,
        ))
        .unwrap();

        assert!(harvest.schemas.is_empty());
        let log = log.lock().unwrap();
        assert_eq!(log.queries.len(), 1);
        assert_eq!(log.closed, 1);
    }

    #[test]
    fn test_failed_table_row_is_skipped() {
        let conn = ScriptedConnection::new()
            .respond(MetadataLevel::Schema, &[], vec![schema("public")])
            .respond(
                MetadataLevel::Table,
                &["public"],
                vec![
                    table("a"),
                    table(Value::Bytes(vec![0xff, 0xfe])),
                    table("c"),
                ],
            );

        let harvest = smol::block_on(extract_database(
            conn,
            &credentials(),
            "conn",
            Dialect::PostgreSQL,
        ))
        .unwrap();

        let names: Vec<&str> = harvest.schemas[0]
            .tables
            .iter()
            .map(|t| t.entity.name())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(harvest.skipped.tables, 1);
    }

    #[test]
    fn test_constraint_type_uses_first_match() {
        let conn = ScriptedConnection::new()
            .respond(MetadataLevel::Schema, &[], vec![schema("public")])
            .respond(MetadataLevel::Table, &["public"], vec![table("orders")])
            .respond(
                MetadataLevel::Column,
                &["public", "orders"],
                vec![column("id", "integer", "NO", 1), column("user_id", "integer", "NO", 2)],
            )
            .respond(
                MetadataLevel::Constraint,
                &["public", "orders"],
                vec![
                    constraint("orders_check", "CHECK", None),
                    constraint("orders_user_fk", "FOREIGN KEY", Some("user_id")),
                    constraint("orders_user_key", "UNIQUE", Some("user_id")),
                    constraint("orders_pkey", "PRIMARY KEY", Some("id")),
                ],
            );

        let harvest = smol::block_on(extract_database(
            conn,
            &credentials(),
            "conn",
            Dialect::PostgreSQL,
        ))
        .unwrap();

        let table = &harvest.schemas[0].tables[0];
        let types: Vec<&str> = table
            .columns
            .iter()
            .map(|c| c.custom_attributes.constraint_type.as_deref().unwrap_or("-"))
            .collect();
        assert_eq!(types, vec!["PRIMARY KEY", "FOREIGN KEY"]);
        assert_eq!(table.constraints.len(), 4);
        assert_eq!(table.constraints[0].constraint_type, "CHECK");
    }

    #[test]
    fn test_query_failure_propagates_and_closes() {
        let conn = ScriptedConnection {
            fail_on: Some(MetadataLevel::Column),
            ..users_table()
        };
        let log = conn.log();

        let result = smol::block_on(extract_database(
            conn,
            &credentials(),
            "conn",
            Dialect::PostgreSQL,
        ));

        assert!(matches!(result, Err(HarvestError::Query { .. })));
        assert_eq!(log.lock().unwrap().closed, 1);
    }

    #[test]
    fn test_connect_failure_still_closes() {
        let conn = ScriptedConnection {
            fail_connect: true,
            ..ScriptedConnection::new()
        };
        let log = conn.log();

        let result = smol::block_on(extract_database(
            conn,
            &credentials(),
            "conn",
            Dialect::PostgreSQL,
        ));

        assert!(matches!(result, Err(HarvestError::Connection { .. })));
        let log = log.lock().unwrap();
        assert!(log.queries.is_empty());
        assert_eq!(log.closed, 1);
    }

    #[test]
    fn test_missing_field_aborts() {
        let conn = ScriptedConnection::new().respond(
            MetadataLevel::Schema,
            &[],
            vec![RawRow::new().with("schema_name", "public")],
        );

        let result = smol::block_on(extract_database(
            conn,
            &credentials(),
            "conn",
            Dialect::PostgreSQL,
        ));

        match result {
            Err(HarvestError::Query { message, .. }) => assert!(message.contains("description")),
            other => panic!("expected query error, got {other:?}"),
        }
    }

    #[test]
    fn test_oracle_uses_service_name() {
        let conn = ScriptedConnection {
            dialect: Some(Dialect::Oracle),
            ..ScriptedConnection::new()
        }
        .respond(MetadataLevel::Schema, &[], vec![schema("HR")]);
        let creds = Credentials {
            service_name: Some("ORCLPDB1".to_string()),
            ..Default::default()
        };

        let harvest =
            smol::block_on(extract_database(conn, &creds, "default/oracle", Dialect::Oracle))
                .unwrap();

        let entity = &harvest.schemas[0].entity;
        assert_eq!(entity.attributes.database_name, "ORCLPDB1");
        assert_eq!(entity.qualified_name(), "default/oracle/HR");
    }
}
