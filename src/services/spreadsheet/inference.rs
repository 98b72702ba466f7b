//! Column naming and value-type inference for worksheet data.

use std::collections::HashSet;

use calamine::Data;

pub const INT: &str = "int64";
pub const FLOAT: &str = "float64";
pub const BOOL: &str = "bool";
pub const DATETIME: &str = "datetime64[ns]";
pub const OBJECT: &str = "object";

/// Name the columns of a header row.
///
/// Empty cells become `Unnamed: <index>`; a repeated name gets a `.1`,
/// `.2`... suffix.
pub fn column_names(header: &[Data]) -> Vec<String> {
    let mut seen = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let base = match cell {
                Data::Empty => format!("Unnamed: {idx}"),
                Data::String(s) if s.trim().is_empty() => format!("Unnamed: {idx}"),
                other => other.to_string(),
            };

            let mut name = base.clone();
            let mut suffix = 1;
            while !seen.insert(name.clone()) {
                name = format!("{base}.{suffix}");
                suffix += 1;
            }
            name
        })
        .collect()
}

#[derive(Default)]
struct Census {
    empty: usize,
    ints: usize,
    fractional: usize,
    bools: usize,
    datetimes: usize,
    other: usize,
}

/// Infer the type name of one column from its data cells (header excluded).
///
/// A column with no data rows at all is `object`; one whose rows are all
/// empty is `float64`.
pub fn infer_dtype<'a>(cells: impl IntoIterator<Item = &'a Data>) -> &'static str {
    let mut census = Census::default();
    let mut rows = 0;

    for cell in cells {
        rows += 1;
        match cell {
            Data::Empty => census.empty += 1,
            Data::String(s) if s.is_empty() => census.empty += 1,
            Data::Int(_) => census.ints += 1,
            Data::Float(f) if f.fract() == 0.0 && f.is_finite() => census.ints += 1,
            Data::Float(_) => census.fractional += 1,
            Data::Bool(_) => census.bools += 1,
            Data::DateTime(_) | Data::DateTimeIso(_) => census.datetimes += 1,
            _ => census.other += 1,
        }
    }

    if rows == 0 {
        return OBJECT;
    }
    let filled = rows - census.empty;
    if filled == 0 {
        return FLOAT;
    }
    if census.other > 0 {
        return OBJECT;
    }

    let numbers = census.ints + census.fractional;
    if numbers == filled {
        if census.fractional == 0 && census.empty == 0 {
            INT
        } else {
            FLOAT
        }
    } else if census.bools == filled && census.empty == 0 {
        BOOL
    } else if census.datetimes == filled {
        DATETIME
    } else {
        OBJECT
    }
}
