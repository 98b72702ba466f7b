//! Oracle type conversion utilities.
//!
//! Oracle reports every numeric catalog column as `NUMBER`, so numbers are
//! fetched as text and narrowed to `Int` or `Float` here.

use oracle::sql_type::OracleType;
use oracle::Row;

use crate::services::database::traits::{RawRow, Value};

/// Converter for Oracle values to the unified `Value` type.
pub struct OracleValueConverter;

impl OracleValueConverter {
    /// Convert an Oracle row to a `RawRow`.
    ///
    /// `columns` holds the result set's column names and types; Oracle
    /// upper-cases unquoted aliases and `RawRow` folds them back.
    pub fn convert_row(row: &Row, columns: &[(String, OracleType)]) -> RawRow {
        RawRow::from_columns(
            columns
                .iter()
                .enumerate()
                .map(|(idx, (name, oracle_type))| (name, Self::extract_value(row, idx, oracle_type))),
        )
    }

    fn extract_value(row: &Row, index: usize, oracle_type: &OracleType) -> Value {
        match oracle_type {
            OracleType::Number(_, _)
            | OracleType::Float(_)
            | OracleType::BinaryFloat
            | OracleType::BinaryDouble
            | OracleType::Int64
            | OracleType::UInt64 => match row.get::<_, Option<String>>(index) {
                Ok(Some(text)) => Self::parse_number(&text),
                _ => Value::Null,
            },

            OracleType::Raw(_) | OracleType::LongRaw | OracleType::BLOB => row
                .get::<_, Option<Vec<u8>>>(index)
                .ok()
                .flatten()
                .map(Value::Bytes)
                .unwrap_or(Value::Null),

            _ => row
                .get::<_, Option<String>>(index)
                .ok()
                .flatten()
                .map(Value::Text)
                .unwrap_or(Value::Null),
        }
    }

    /// Narrow the text form of an Oracle NUMBER.
    pub(crate) fn parse_number(text: &str) -> Value {
        let text = text.trim();
        if let Ok(v) = text.parse::<i64>() {
            return Value::Int(v);
        }
        if let Ok(v) = text.parse::<f64>() {
            return Value::Float(v);
        }
        Value::Other {
            type_name: "NUMBER".to_string(),
            display: text.to_string(),
        }
    }
}
