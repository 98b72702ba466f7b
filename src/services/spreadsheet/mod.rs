//! Spreadsheet harvesting.
//!
//! Each worksheet of a workbook becomes one SCHEMA holding one TABLE of the
//! same name. The first row is the header; column types are inferred from
//! the remaining rows.

pub mod inference;

use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use tracing::{debug, error, info, info_span};
use uuid::Uuid;

use crate::error::{HarvestError, HarvestResult};
use crate::services::database::traits::RawRow;
use crate::services::transform::{
    Entity, EntityKind, GenericTransformer, Harvest, SchemaNode, SkipTally, TableNode, fields,
    transformer::NULLABLE_MARKER,
};

/// Workbook extensions the extractor accepts, compared case-insensitively
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Connection-qualified name used when the caller does not supply one
pub const DEFAULT_CONNECTION_QUALIFIED_NAME: &str = "default/excel";

/// Extract one SCHEMA/TABLE pair per worksheet of the workbook at `path`.
///
/// # Errors
///
/// Returns `HarvestError::File` when the file is missing, is not an
/// `.xlsx`/`.xls` workbook, or cannot be read.
pub fn extract_spreadsheet(path: &Path, connection_qualified_name: &str) -> HarvestResult<Harvest> {
    let run_id = Uuid::new_v4();
    let span = info_span!("harvest", dialect = "excel", run_id = %run_id);
    let _guard = span.enter();

    let result = read_workbook(path, connection_qualified_name, run_id);
    match &result {
        Ok(harvest) => info!(
            path = %path.display(),
            sheets = harvest.schemas.len(),
            columns = harvest.column_count(),
            skipped = harvest.skipped.total(),
            "extraction finished"
        ),
        Err(e) => error!(error = %e, "spreadsheet extraction failed"),
    }
    result
}

/// Check that `path` exists and has a workbook extension.
pub fn validate_path(path: &Path) -> HarvestResult<()> {
    if !path.exists() {
        return Err(HarvestError::file(path, "file not found"));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(HarvestError::file(
            path,
            "invalid file format, must be .xlsx or .xls",
        ));
    }
    Ok(())
}

fn read_workbook(path: &Path, connection_qualified_name: &str, run_id: Uuid) -> HarvestResult<Harvest> {
    validate_path(path)?;

    let mut workbook = open_workbook_auto(path).map_err(|e| HarvestError::file(path, e.to_string()))?;
    let database_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut sheets = SheetHarvester {
        transformer: GenericTransformer::new("excel"),
        connection_qualified_name,
        database_name: &database_name,
        skipped: SkipTally::default(),
    };

    let mut schemas = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| HarvestError::file(path, format!("sheet {sheet_name:?}: {e}")))?;
        debug!(sheet = %sheet_name, rows = range.height(), "reading sheet");

        if let Some(node) = sheets.sheet(&sheet_name, &range) {
            schemas.push(node);
        }
    }

    Ok(Harvest {
        run_id,
        schemas,
        skipped: sheets.skipped,
    })
}

struct SheetHarvester<'a> {
    transformer: GenericTransformer,
    connection_qualified_name: &'a str,
    database_name: &'a str,
    skipped: SkipTally,
}

impl SheetHarvester<'_> {
    /// Build the SCHEMA → TABLE → COLUMN subtree for one worksheet.
    fn sheet(&mut self, sheet_name: &str, range: &Range<Data>) -> Option<SchemaNode> {
        let base = RawRow::new()
            .with(fields::CONNECTION_QUALIFIED_NAME, self.connection_qualified_name)
            .with(fields::DATABASE_NAME, self.database_name)
            .with(fields::SCHEMA_NAME, sheet_name)
            .with(fields::DESCRIPTION, "");

        let mut schema = SchemaNode::new(self.transform(EntityKind::Schema, &base)?);

        let table_fields = base.clone().with(fields::TABLE_NAME, sheet_name);
        let Some(entity) = self.transform(EntityKind::Table, &table_fields) else {
            return Some(schema);
        };
        let mut table = TableNode::new(entity);

        // the range starts at the first used cell; blank leading columns
        // still count as columns
        let offset = range.start().map_or(0, |(_, col)| col as usize);
        let blank = Data::Empty;

        let mut rows = range.rows();
        let header: Vec<Data> = std::iter::repeat_n(Data::Empty, offset)
            .chain(rows.next().unwrap_or(&[]).iter().cloned())
            .collect();
        let data: Vec<&[Data]> = rows.collect();

        for (idx, name) in inference::column_names(&header).into_iter().enumerate() {
            let cells = data.iter().filter_map(|row| match idx.checked_sub(offset) {
                Some(col) => row.get(col),
                None => Some(&blank),
            });
            let dtype = inference::infer_dtype(cells);
            let column_fields = table_fields
                .clone()
                .with(fields::COLUMN_NAME, name)
                .with(fields::DATA_TYPE, dtype)
                .with(fields::IS_NULLABLE, NULLABLE_MARKER)
                .with(fields::ORDINAL_POSITION, idx as i64 + 1)
                .with(fields::CONSTRAINT_TYPE, "");

            if let Some(column) = self.transform(EntityKind::Column, &column_fields) {
                table.columns.push(column);
            }
        }

        schema.tables.push(table);
        Some(schema)
    }

    fn transform(&mut self, kind: EntityKind, fields: &RawRow) -> Option<Entity> {
        self.transformer.transform_counted(kind, fields, &mut self.skipped)
    }
}
