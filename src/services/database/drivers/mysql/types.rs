//! MySQL type conversion utilities.
//!
//! information_schema returns names as (VAR)CHAR, or as binary strings on
//! some server versions, and positions as unsigned integers. Those are the
//! decode paths kept here; anything else is kept as its text form.

use sqlx::mysql::{MySqlColumn, MySqlRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::services::database::traits::{RawRow, Value};

/// How a column of a given MySQL type is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decode {
    Signed,
    Unsigned,
    Text,
    Binary,
    Fallback,
}

impl Decode {
    pub(crate) fn for_type(type_name: &str) -> Self {
        match type_name {
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" => Self::Signed,
            "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
            | "INTEGER UNSIGNED" | "BIGINT UNSIGNED" => Self::Unsigned,
            "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" => Self::Text,
            _ if type_name.starts_with("ENUM") || type_name.starts_with("SET") => Self::Text,
            // the transformer decodes these if they are UTF-8
            "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => Self::Binary,
            _ => Self::Fallback,
        }
    }
}

/// Converter for MySQL values to the unified `Value` type.
pub struct MySqlValueConverter;

impl MySqlValueConverter {
    /// Convert a MySQL row to a `RawRow` keyed by lower-cased column name.
    ///
    /// information_schema reports names like `COLUMN_NAME` unless aliased;
    /// `RawRow` folds them either way.
    pub fn convert_row(mysql_row: &MySqlRow) -> RawRow {
        RawRow::from_columns(
            mysql_row
                .columns()
                .iter()
                .enumerate()
                .map(|(idx, col)| (col.name(), Self::extract_value(mysql_row, col, idx))),
        )
    }

    fn extract_value(row: &MySqlRow, column: &MySqlColumn, index: usize) -> Value {
        match row.try_get_raw(index) {
            Ok(raw) if raw.is_null() => return Value::Null,
            Err(_) => return Value::Null,
            _ => {}
        }

        let type_name = column.type_info().name();
        let decoded = match Decode::for_type(type_name) {
            Decode::Signed => row.try_get::<i64, _>(index).map(Value::Int),
            Decode::Unsigned => row
                .try_get::<u64, _>(index)
                .map(|v| Self::unsigned_value(v, type_name)),
            Decode::Text => row.try_get::<String, _>(index).map(Value::Text),
            Decode::Binary => row.try_get::<Vec<u8>, _>(index).map(Value::Bytes),
            Decode::Fallback => return Self::decode_as_string_fallback(row, index, type_name),
        };
        decoded.unwrap_or(Value::Null)
    }

    /// Unsigned integers map to `Int` unless they overflow i64.
    fn unsigned_value(v: u64, type_name: &str) -> Value {
        match i64::try_from(v) {
            Ok(v) => Value::Int(v),
            Err(_) => Value::Other {
                type_name: type_name.to_string(),
                display: v.to_string(),
            },
        }
    }

    /// Fallback: keep the text form of types the catalog does not normally return.
    fn decode_as_string_fallback(row: &MySqlRow, index: usize, type_name: &str) -> Value {
        let display = row
            .try_get_unchecked::<String, _>(index)
            .unwrap_or_else(|_| "<unknown>".to_string());
        Value::Other {
            type_name: type_name.to_string(),
            display,
        }
    }
}
