//! PostgreSQL type conversion utilities.
//!
//! The catalog queries cast names to `text` and positions to `int`, so only
//! scalar text, integer and boolean columns need a dedicated decode path.
//! Anything else is kept as its text form.

use sqlx::postgres::{PgColumn, PgRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::services::database::traits::{RawRow, Value};

/// How a column of a given PostgreSQL type is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decode {
    Bool,
    Int2,
    Int4,
    Int8,
    Oid,
    Text,
    TextArray,
    Fallback,
}

impl Decode {
    pub(crate) fn for_type(type_name: &str) -> Self {
        match type_name {
            "BOOL" => Self::Bool,
            "INT2" | "SMALLINT" => Self::Int2,
            "INT4" | "INT" | "INTEGER" => Self::Int4,
            "INT8" | "BIGINT" => Self::Int8,
            "OID" => Self::Oid,
            "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => Self::Text,
            "_TEXT" | "TEXT[]" | "_NAME" | "NAME[]" => Self::TextArray,
            _ => Self::Fallback,
        }
    }
}

/// Converter for PostgreSQL values to the unified `Value` type.
pub struct PgValueConverter;

impl PgValueConverter {
    /// Convert a PostgreSQL row to a `RawRow` keyed by lower-cased column name.
    pub fn convert_row(pg_row: &PgRow) -> RawRow {
        RawRow::from_columns(
            pg_row
                .columns()
                .iter()
                .enumerate()
                .map(|(idx, col)| (col.name(), Self::extract_value(pg_row, col, idx))),
        )
    }

    fn extract_value(row: &PgRow, column: &PgColumn, index: usize) -> Value {
        match row.try_get_raw(index) {
            Ok(raw) if raw.is_null() => return Value::Null,
            Err(_) => return Value::Null,
            _ => {}
        }

        let type_name = column.type_info().name();
        let decoded = match Decode::for_type(type_name) {
            Decode::Bool => row.try_get::<bool, _>(index).map(Value::Bool),
            Decode::Int2 => row.try_get::<i16, _>(index).map(|v| Value::Int(v as i64)),
            Decode::Int4 => row.try_get::<i32, _>(index).map(|v| Value::Int(v as i64)),
            Decode::Int8 => row.try_get::<i64, _>(index).map(Value::Int),
            Decode::Oid => row
                .try_get::<sqlx::postgres::types::Oid, _>(index)
                .map(|oid| Value::Int(oid.0 as i64)),
            Decode::Text => row.try_get::<String, _>(index).map(Value::Text),
            Decode::TextArray => row
                .try_get::<Vec<String>, _>(index)
                .map(|arr| Value::Array(arr.into_iter().map(Value::Text).collect())),
            Decode::Fallback => return Self::decode_as_string_fallback(row, index, type_name),
        };
        decoded.unwrap_or(Value::Null)
    }

    /// Fallback: keep the text form of types the catalog does not normally return.
    fn decode_as_string_fallback(row: &PgRow, index: usize, type_name: &str) -> Value {
        let display = row
            .try_get_unchecked::<String, _>(index)
            .unwrap_or_else(|_| "<unknown>".to_string());
        Value::Other {
            type_name: type_name.to_string(),
            display,
        }
    }
}
