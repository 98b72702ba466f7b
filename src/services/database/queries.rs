//! Dialect query catalog.
//!
//! One parameterized query per (level, dialect). Each query aliases its
//! output columns to the field names of the level's record type so the
//! assembler never has to know which dialect it is walking.

use super::traits::{Dialect, MetadataLevel};

const PG_SCHEMAS: &str = r#"
    SELECT s.schema_name::text AS schema_name,
           obj_description(n.oid, 'pg_namespace') AS description
    FROM information_schema.schemata s
    JOIN pg_namespace n ON s.schema_name = n.nspname
    WHERE s.schema_name NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
"#;

const PG_TABLES: &str = r#"
    SELECT t.table_name::text AS table_name,
           obj_description(to_regclass(quote_ident(t.table_schema) || '.' || quote_ident(t.table_name))::oid, 'pg_class') AS description
    FROM information_schema.tables t
    WHERE t.table_schema::text = $1
"#;

const PG_COLUMNS: &str = r#"
    SELECT c.column_name::text AS column_name,
           c.data_type::text AS data_type,
           c.is_nullable::text AS is_nullable,
           c.ordinal_position::int AS ordinal_position,
           col_description(to_regclass(quote_ident(c.table_schema) || '.' || quote_ident(c.table_name))::oid, c.ordinal_position::int) AS description
    FROM information_schema.columns c
    WHERE c.table_schema::text = $1 AND c.table_name::text = $2
    ORDER BY c.ordinal_position
"#;

const PG_CONSTRAINTS: &str = r#"
    SELECT tc.constraint_name::text AS constraint_name,
           tc.constraint_type::text AS constraint_type,
           kcu.column_name::text AS column_name
    FROM information_schema.table_constraints tc
    LEFT JOIN information_schema.key_column_usage kcu
        ON tc.constraint_name = kcu.constraint_name
        AND tc.table_schema = kcu.table_schema
        AND tc.table_name = kcu.table_name
    WHERE tc.table_schema::text = $1 AND tc.table_name::text = $2
"#;

const MYSQL_SCHEMAS: &str = r#"
    SELECT SCHEMA_NAME AS schema_name, NULL AS description
    FROM information_schema.SCHEMATA
    WHERE SCHEMA_NAME NOT IN ('information_schema', 'mysql', 'performance_schema', 'sys')
"#;

const MYSQL_TABLES: &str = r#"
    SELECT TABLE_NAME AS table_name, TABLE_COMMENT AS description
    FROM information_schema.TABLES
    WHERE TABLE_SCHEMA = ?
"#;

const MYSQL_COLUMNS: &str = r#"
    SELECT COLUMN_NAME AS column_name,
           DATA_TYPE AS data_type,
           IS_NULLABLE AS is_nullable,
           ORDINAL_POSITION AS ordinal_position,
           COLUMN_COMMENT AS description
    FROM information_schema.COLUMNS
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
    ORDER BY ORDINAL_POSITION
"#;

const MYSQL_CONSTRAINTS: &str = r#"
    SELECT tc.CONSTRAINT_NAME AS constraint_name,
           tc.CONSTRAINT_TYPE AS constraint_type,
           kcu.COLUMN_NAME AS column_name
    FROM information_schema.TABLE_CONSTRAINTS tc
    LEFT JOIN information_schema.KEY_COLUMN_USAGE kcu
        ON tc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME
        AND tc.TABLE_SCHEMA = kcu.TABLE_SCHEMA
        AND tc.TABLE_NAME = kcu.TABLE_NAME
    WHERE tc.TABLE_SCHEMA = ? AND tc.TABLE_NAME = ?
"#;

const ORACLE_SCHEMAS: &str = r#"
    SELECT username AS schema_name, NULL AS description
    FROM all_users
    WHERE username NOT IN ('SYS', 'SYSTEM', 'PUBLIC')
"#;

const ORACLE_TABLES: &str = r#"
    SELECT table_name AS table_name, comments AS description
    FROM all_tab_comments
    WHERE owner = :1 AND table_type = 'TABLE'
"#;

// all_col_comments has no type information, so columns come from
// all_tab_columns. Oracle's Y/N flag is mapped to the YES/NO marker.
const ORACLE_COLUMNS: &str = r#"
    SELECT c.column_name AS column_name,
           c.data_type AS data_type,
           CASE c.nullable WHEN 'Y' THEN 'YES' ELSE 'NO' END AS is_nullable,
           c.column_id AS ordinal_position,
           cc.comments AS description
    FROM all_tab_columns c
    LEFT JOIN all_col_comments cc
        ON c.owner = cc.owner
        AND c.table_name = cc.table_name
        AND c.column_name = cc.column_name
    WHERE c.owner = :1 AND c.table_name = :2
    ORDER BY c.column_id
"#;

const ORACLE_CONSTRAINTS: &str = r#"
    SELECT c.constraint_name AS constraint_name,
           c.constraint_type AS constraint_type,
           cc.column_name AS column_name
    FROM all_constraints c
    LEFT JOIN all_cons_columns cc
        ON c.constraint_name = cc.constraint_name
        AND c.owner = cc.owner
    WHERE c.owner = :1 AND c.table_name = :2
"#;

/// Look up the catalog query for a level and dialect.
pub fn query_for(level: MetadataLevel, dialect: Dialect) -> &'static str {
    match (level, dialect) {
        (MetadataLevel::Schema, Dialect::PostgreSQL) => PG_SCHEMAS,
        (MetadataLevel::Table, Dialect::PostgreSQL) => PG_TABLES,
        (MetadataLevel::Column, Dialect::PostgreSQL) => PG_COLUMNS,
        (MetadataLevel::Constraint, Dialect::PostgreSQL) => PG_CONSTRAINTS,

        (MetadataLevel::Schema, Dialect::MySQL) => MYSQL_SCHEMAS,
        (MetadataLevel::Table, Dialect::MySQL) => MYSQL_TABLES,
        (MetadataLevel::Column, Dialect::MySQL) => MYSQL_COLUMNS,
        (MetadataLevel::Constraint, Dialect::MySQL) => MYSQL_CONSTRAINTS,

        (MetadataLevel::Schema, Dialect::Oracle) => ORACLE_SCHEMAS,
        (MetadataLevel::Table, Dialect::Oracle) => ORACLE_TABLES,
        (MetadataLevel::Column, Dialect::Oracle) => ORACLE_COLUMNS,
        (MetadataLevel::Constraint, Dialect::Oracle) => ORACLE_CONSTRAINTS,
    }
}

/// Find which level a catalog query belongs to.
pub fn level_of(query: &str, dialect: Dialect) -> Option<MetadataLevel> {
    MetadataLevel::all()
        .into_iter()
        .find(|level| query_for(*level, dialect) == query)
}
