use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Result, WortlautError};

/// One vocabulary row: cell text aligned positionally with the configured
/// column order. Cells are normalized on construction (trimmed, blank
/// becomes None) and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct VocabRow {
    /// 1-based data row index (header row excluded)
    pub index: usize,
    cells: Vec<Option<String>>,
}

impl VocabRow {
    pub fn new(index: usize, cells: Vec<Option<String>>) -> Self {
        let cells = cells
            .into_iter()
            .map(|cell| {
                cell.and_then(|text| {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        Some(trimmed.to_string())
                    }
                })
            })
            .collect();

        Self { index, cells }
    }

    /// Text of the cell at the given column position, if non-blank
    pub fn cell(&self, column_idx: usize) -> Option<&str> {
        self.cells.get(column_idx)?.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// All non-blank cells joined for caption display
    pub fn display_text(&self) -> String {
        self.cells
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Read vocabulary rows from a tabular file. The first row is treated as
/// a header and skipped; cells map positionally onto the configured
/// columns, extra cells are ignored.
pub fn read_rows<P: AsRef<Path>>(path: P, columns: &[String]) -> Result<Vec<VocabRow>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(WortlautError::FileNotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let rows = match extension.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => read_workbook(path, columns)?,
        "csv" => read_csv(path, columns)?,
        other => {
            return Err(WortlautError::UnsupportedFormat(format!(
                "Unsupported table format '{}', expected xlsx or csv",
                other
            )));
        }
    };

    info!("Read {} data rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn read_workbook(path: &Path, columns: &[String]) -> Result<Vec<VocabRow>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| WortlautError::Table(format!("Failed to open workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| WortlautError::Table("Workbook has no sheets".to_string()))?
        .map_err(|e| WortlautError::Table(format!("Failed to read sheet: {}", e)))?;

    let mut rows = Vec::new();
    for (row_idx, row) in range.rows().enumerate().skip(1) {
        let cells = (0..columns.len())
            .map(|col_idx| match row.get(col_idx) {
                None | Some(Data::Empty) => None,
                Some(cell) => Some(cell.to_string()),
            })
            .collect();

        debug!("Read workbook row {}", row_idx);
        rows.push(VocabRow::new(row_idx, cells));
    }

    Ok(rows)
}

fn read_csv(path: &Path, columns: &[String]) -> Result<Vec<VocabRow>> {
    // flexible: rows may carry fewer cells than the header, missing
    // trailing cells are treated as blank
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| WortlautError::Table(format!("Failed to open CSV: {}", e)))?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| WortlautError::Table(format!("Failed to read CSV row: {}", e)))?;

        let cells = (0..columns.len())
            .map(|col_idx| record.get(col_idx).map(|s| s.to_string()))
            .collect();

        rows.push(VocabRow::new(idx + 1, cells));
    }

    Ok(rows)
}
